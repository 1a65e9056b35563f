//! Domain services. Each operation validates its input, reads through the
//! unit of work, stages its mutations and commits them with one
//! `save_changes` call.

pub mod applications;
pub mod courses;
pub mod import;
pub mod messages;
pub mod night_shifts;
pub mod posts;
pub mod teams;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

use crate::outbound::{BlobError, EmailError, NotifyError};
use crate::persistence::RepositoryError;

/// Error raised by every service operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A business rule rejected the request before anything was written.
    #[error("{0}")]
    InvalidOperation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error(transparent)]
    Email(#[from] EmailError),
    #[error(transparent)]
    Blob(#[from] BlobError),
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// The user-facing message of a rule violation.
    pub fn rejection(&self) -> Option<&str> {
        match self {
            ServiceError::InvalidOperation(message) => Some(message),
            _ => None,
        }
    }
}

/// Trim `value` and check it is non-empty and at most `max_chars` long.
pub(crate) fn required_text(
    value: &str,
    max_chars: usize,
    empty: &str,
    too_long: &str,
) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::invalid(empty));
    }
    if trimmed.chars().count() > max_chars {
        return Err(ServiceError::invalid(too_long));
    }
    Ok(trimmed.to_string())
}

/// Case-insensitive substring match used by the list filters.
pub(crate) fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    haystack.to_lowercase().contains(&keyword.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_bounds() {
        assert_eq!(
            required_text("  Đội 1 ", 10, "empty", "long").unwrap(),
            "Đội 1"
        );
        assert_eq!(
            required_text("   ", 10, "empty", "long")
                .unwrap_err()
                .rejection(),
            Some("empty")
        );
        assert_eq!(
            required_text("ắắắắắ", 4, "empty", "long")
                .unwrap_err()
                .rejection(),
            Some("long")
        );
    }

    #[test]
    fn keyword_match_ignores_case() {
        assert!(contains_keyword("Mùa Hè Xanh 2025", "mùa hè"));
        assert!(!contains_keyword("Tiếp sức mùa thi", "xanh"));
    }

    #[test]
    fn infrastructure_errors_have_no_rejection_message() {
        let err = ServiceError::from(RepositoryError::Unavailable("offline".to_string()));
        assert!(err.rejection().is_none());
        assert_eq!(err.to_string(), "repository unavailable: offline");
    }
}
