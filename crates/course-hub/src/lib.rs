//! Service layer for a course-management backend.
//!
//! Services validate input, read through the [`persistence::UnitOfWork`]
//! gateway, stage mutations and commit them with a single
//! `save_changes`. Outbound side effects (notifications, e-mail, blobs) go
//! through the traits in [`outbound`].

pub mod clock;
pub mod config;
pub mod error;
pub mod outbound;
pub mod persistence;
pub mod security;
pub mod telemetry;
pub mod validation;
pub mod workflows;
