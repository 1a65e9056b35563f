//! Announcements and articles, optionally attached to a course and carrying
//! one image stored in the blob store.

pub mod domain;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{ImageUpload, NewPost, Post, PostFilter, PostId, PostImage, PostPatch};
pub use service::PostService;
