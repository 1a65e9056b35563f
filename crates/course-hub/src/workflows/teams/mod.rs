//! Teams of approved students inside a course.

pub mod domain;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{NewTeam, Team, TeamId, TeamPatch};
pub use service::TeamService;
