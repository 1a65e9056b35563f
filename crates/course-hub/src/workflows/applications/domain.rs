use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::{entity_id, Entity};
use crate::workflows::courses::CourseId;
use crate::workflows::users::UserId;

entity_id!(
    /// Identifier of a student application.
    ApplicationId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

/// A student's application to a course. `reviewer_id` stays `None` until a
/// secretary is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentCourse {
    pub id: ApplicationId,
    pub course_id: CourseId,
    pub student_id: UserId,
    pub student_code: String,
    pub reviewer_id: Option<UserId>,
    pub status: ApplicationStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Entity for StudentCourse {
    type Id = ApplicationId;
    const NAME: &'static str = "application";

    fn id(&self) -> ApplicationId {
        self.id
    }

    fn assign_id(&mut self, id: ApplicationId) {
        self.id = id;
    }
}

impl StudentCourse {
    pub fn is_unassigned(&self) -> bool {
        self.reviewer_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewDecision {
    Approve,
    Reject,
}
