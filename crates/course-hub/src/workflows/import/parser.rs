use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::io::Read;

use super::SeedImportError;
use crate::workflows::applications::{ApplicationId, ApplicationStatus, StudentCourse};
use crate::workflows::courses::CourseId;
use crate::workflows::users::{Role, User, UserId, UserStatus};

/// Header row plus one data row per record; data starts on line 2.
const FIRST_DATA_LINE: usize = 2;

pub(crate) fn parse_users<R: Read>(
    reader: R,
    imported_at: DateTime<Utc>,
) -> Result<Vec<User>, SeedImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut users = Vec::new();
    let mut seen = BTreeSet::new();

    for (index, record) in csv_reader.deserialize::<UserRow>().enumerate() {
        let row = record?;
        let line = FIRST_DATA_LINE + index;
        if !seen.insert(row.id) {
            return Err(duplicate_id(line, row.id));
        }
        users.push(row.into_user(line, imported_at)?);
    }

    Ok(users)
}

pub(crate) fn parse_applications<R: Read>(
    reader: R,
    imported_at: DateTime<Utc>,
) -> Result<Vec<StudentCourse>, SeedImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut applications = Vec::new();
    let mut seen = BTreeSet::new();

    for (index, record) in csv_reader.deserialize::<ApplicationRow>().enumerate() {
        let row = record?;
        let line = FIRST_DATA_LINE + index;
        if !seen.insert(row.id) {
            return Err(duplicate_id(line, row.id));
        }
        applications.push(row.into_application(line, imported_at)?);
    }

    Ok(applications)
}

#[derive(Debug, Deserialize)]
struct UserRow {
    id: u64,
    full_name: String,
    email: String,
    role: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    student_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
}

impl UserRow {
    fn into_user(self, line: usize, imported_at: DateTime<Utc>) -> Result<User, SeedImportError> {
        if self.id == 0 {
            return Err(invalid(line, "id must be positive"));
        }
        let role = Role::parse(&self.role)
            .ok_or_else(|| invalid(line, format!("unknown role `{}`", self.role)))?;
        let status = match self.status.as_deref() {
            Some(raw) => UserStatus::parse(raw)
                .ok_or_else(|| invalid(line, format!("unknown status `{}`", raw)))?,
            None => UserStatus::Active,
        };

        Ok(User {
            id: UserId(self.id),
            full_name: self.full_name,
            email: self.email.to_lowercase(),
            student_code: self.student_code,
            phone: self.phone,
            role,
            status,
            password_hash: String::new(),
            created_at: imported_at,
            updated_at: imported_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApplicationRow {
    id: u64,
    course_id: u64,
    student_id: u64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    student_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    reviewer_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
}

impl ApplicationRow {
    fn into_application(
        self,
        line: usize,
        imported_at: DateTime<Utc>,
    ) -> Result<StudentCourse, SeedImportError> {
        if self.id == 0 {
            return Err(invalid(line, "id must be positive"));
        }
        let reviewer_id = match self.reviewer_id.as_deref() {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .map(UserId)
                    .map_err(|_| invalid(line, format!("invalid reviewer_id `{}`", raw)))?,
            ),
            None => None,
        };
        let status = match self.status.as_deref() {
            Some(raw) => ApplicationStatus::parse(raw)
                .ok_or_else(|| invalid(line, format!("unknown status `{}`", raw)))?,
            None => ApplicationStatus::Pending,
        };
        let created_at = match self.created_at.as_deref() {
            Some(raw) => parse_timestamp(raw)
                .ok_or_else(|| invalid(line, format!("invalid created_at `{}`", raw)))?,
            None => imported_at,
        };

        Ok(StudentCourse {
            id: ApplicationId(self.id),
            course_id: CourseId(self.course_id),
            student_id: UserId(self.student_id),
            student_code: self.student_code.unwrap_or_default(),
            reviewer_id,
            status,
            note: None,
            created_at,
            updated_at: created_at,
            assigned_at: reviewer_id.map(|_| created_at),
            reviewed_at: None,
        })
    }
}

fn invalid(line: usize, reason: impl Into<String>) -> SeedImportError {
    SeedImportError::InvalidRow {
        line,
        reason: reason.into(),
    }
}

fn duplicate_id(line: usize, id: u64) -> SeedImportError {
    invalid(line, format!("duplicate id {}", id))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }

    None
}
