//! Student applications to courses, secretary review and automatic
//! distribution of unassigned applications.

pub mod allocator;
pub mod domain;
pub mod service;

#[cfg(test)]
mod tests;

pub use allocator::{plan_assignments, Assignment, SecretaryLoad};
pub use domain::{ApplicationId, ApplicationStatus, ReviewDecision, StudentCourse};
pub use service::{ApplicationService, APPLICATION_LIST_LINK};
