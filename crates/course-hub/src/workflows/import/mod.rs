//! Seeds a store from CSV exports of users and applications.

mod parser;

use chrono::{DateTime, Utc};
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::persistence::MemoryStore;
use crate::workflows::applications::StudentCourse;
use crate::workflows::users::User;

#[derive(Debug)]
pub enum SeedImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: usize, reason: String },
}

impl std::fmt::Display for SeedImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedImportError::Io(err) => write!(f, "failed to read seed export: {}", err),
            SeedImportError::Csv(err) => write!(f, "invalid seed CSV data: {}", err),
            SeedImportError::InvalidRow { line, reason } => {
                write!(f, "invalid seed row on line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for SeedImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedImportError::Io(err) => Some(err),
            SeedImportError::Csv(err) => Some(err),
            SeedImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for SeedImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SeedImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Rows parsed from one users export and one applications export.
#[derive(Debug, Default)]
pub struct SeedData {
    pub users: Vec<User>,
    pub applications: Vec<StudentCourse>,
}

impl SeedData {
    /// Insert every row as already committed.
    pub fn load_into(self, store: &MemoryStore) {
        let users = store.users.seed(self.users).len();
        let applications = store.applications.seed(self.applications).len();
        info!(users, applications, "seed data loaded");
    }
}

pub struct SeedImporter;

impl SeedImporter {
    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        users: P,
        applications: Q,
        imported_at: DateTime<Utc>,
    ) -> Result<SeedData, SeedImportError> {
        let users = std::fs::File::open(users)?;
        let applications = std::fs::File::open(applications)?;
        Self::from_readers(users, applications, imported_at)
    }

    /// Blank timestamps in the exports fall back to `imported_at`.
    pub fn from_readers<R: Read, S: Read>(
        users: R,
        applications: S,
        imported_at: DateTime<Utc>,
    ) -> Result<SeedData, SeedImportError> {
        Ok(SeedData {
            users: parser::parse_users(users, imported_at)?,
            applications: parser::parse_applications(applications, imported_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::UnitOfWork;
    use crate::workflows::users::{Role, UserId};
    use chrono::TimeZone;
    use std::io::Cursor;

    const USERS: &str = "id,full_name,email,role,status,student_code\n\
                         1,Lê Văn C,c@example.edu,secretary,active,\n\
                         2,Phạm Thị D,d@example.edu,student,active,SV002\n";
    const APPLICATIONS: &str = "id,course_id,student_id,student_code,reviewer_id,status\n\
                                7,3,2,SV002,,pending\n";

    fn imported_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn loaded_rows_are_committed_without_a_save() {
        let seed = SeedImporter::from_readers(
            Cursor::new(USERS),
            Cursor::new(APPLICATIONS),
            imported_at(),
        )
        .expect("parse seed");
        let store = MemoryStore::default();
        seed.load_into(&store);

        assert_eq!(store.commit_count(), 0);
        assert_eq!(store.pending_changes(), 0);
        let secretary = store
            .users()
            .get_by_id(UserId(1))
            .await
            .unwrap()
            .expect("seeded secretary");
        assert_eq!(secretary.role, Role::Secretary);
        assert_eq!(store.applications.rows().len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = SeedImporter::from_paths(
            "/nonexistent/users.csv",
            "/nonexistent/applications.csv",
            imported_at(),
        );
        match result {
            Err(err @ SeedImportError::Io(_)) => {
                assert!(err.to_string().starts_with("failed to read seed export"));
                assert!(std::error::Error::source(&err).is_some());
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_row_display_names_the_line() {
        let err = SeedImportError::InvalidRow {
            line: 4,
            reason: "unknown role `guest`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid seed row on line 4: unknown role `guest`"
        );
    }
}
