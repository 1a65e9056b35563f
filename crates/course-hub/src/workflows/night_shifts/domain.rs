use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::{entity_id, Entity};
use crate::workflows::courses::CourseId;
use crate::workflows::users::UserId;

entity_id!(
    /// Identifier of a night shift.
    NightShiftId
);

entity_id!(
    /// Identifier of a staff assignment to a night shift.
    ShiftAssignmentId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightShift {
    pub id: NightShiftId,
    pub course_id: CourseId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    /// Earlier than `start_time` when the shift runs past midnight.
    pub end_time: NaiveTime,
    pub location: String,
    pub required_staff: u32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for NightShift {
    type Id = NightShiftId;
    const NAME: &'static str = "night shift";

    fn id(&self) -> NightShiftId {
        self.id
    }

    fn assign_id(&mut self, id: NightShiftId) {
        self.id = id;
    }
}

impl NightShift {
    pub fn crosses_midnight(&self) -> bool {
        self.end_time < self.start_time
    }

    pub fn duration(&self) -> Duration {
        let span = self.end_time.signed_duration_since(self.start_time);
        if self.crosses_midnight() {
            span + Duration::days(1)
        } else {
            span
        }
    }

    pub fn merge(&mut self, patch: NightShiftPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(required_staff) = patch.required_staff {
            self.required_staff = required_staff;
        }
        if let Some(note) = patch.note {
            self.note = Some(note);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Assigned,
    Completed,
    Absent,
}

impl AssignmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Absent => "absent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightShiftAssignment {
    pub id: ShiftAssignmentId,
    pub night_shift_id: NightShiftId,
    pub user_id: UserId,
    pub assigned_by: UserId,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for NightShiftAssignment {
    type Id = ShiftAssignmentId;
    const NAME: &'static str = "night shift assignment";

    fn id(&self) -> ShiftAssignmentId {
        self.id
    }

    fn assign_id(&mut self, id: ShiftAssignmentId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNightShift {
    pub course_id: CourseId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub required_staff: u32,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NightShiftPatch {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub required_staff: Option<u32>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShiftFilter {
    pub course_id: Option<CourseId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ShiftFilter {
    pub fn matches(&self, shift: &NightShift) -> bool {
        self.course_id.map_or(true, |course| shift.course_id == course)
            && self.from.map_or(true, |from| shift.date >= from)
            && self.to.map_or(true, |to| shift.date <= to)
    }
}
