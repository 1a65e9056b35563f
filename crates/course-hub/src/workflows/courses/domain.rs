use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::{entity_id, Entity};
use crate::workflows::contains_keyword;

entity_id!(
    /// Identifier of a course.
    CourseId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseStatus {
    Draft,
    Open,
    Closed,
    Completed,
}

impl CourseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Open => "open",
            CourseStatus::Closed => "closed",
            CourseStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub description: String,
    pub location: String,
    pub max_students: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub application_start: NaiveDate,
    pub application_end: NaiveDate,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Course {
    type Id = CourseId;
    const NAME: &'static str = "course";

    fn id(&self) -> CourseId {
        self.id
    }

    fn assign_id(&mut self, id: CourseId) {
        self.id = id;
    }
}

impl Course {
    /// Open courses accept applications inside the inclusive window.
    pub fn accepts_applications_on(&self, day: NaiveDate) -> bool {
        self.status == CourseStatus::Open
            && self.application_start <= day
            && day <= self.application_end
    }

    pub fn runs_on(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    pub fn merge(&mut self, patch: CoursePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(max_students) = patch.max_students {
            self.max_students = max_students;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(application_start) = patch.application_start {
            self.application_start = application_start;
        }
        if let Some(application_end) = patch.application_end {
            self.application_end = application_end;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub max_students: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub application_start: NaiveDate,
    pub application_end: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoursePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_students: Option<u32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub application_start: Option<NaiveDate>,
    #[serde(default)]
    pub application_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub status: Option<CourseStatus>,
    pub keyword: Option<String>,
    /// Keep courses running on this day.
    pub active_on: Option<NaiveDate>,
}

impl CourseFilter {
    pub fn matches(&self, course: &Course) -> bool {
        if self.status.is_some_and(|status| status != course.status) {
            return false;
        }
        if self.active_on.is_some_and(|day| !course.runs_on(day)) {
            return false;
        }
        match self.keyword.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => contains_keyword(&course.name, keyword),
            _ => true,
        }
    }
}
