//! Version-store-specific error types.

use crate::domain::foundation::{ContentId, DomainError, ErrorCode};

use super::VersionNumber;

/// Errors surfaced by version-store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Content item has no versions (or does not exist).
    ContentNotFound(ContentId),
    /// Requested version number does not exist for the content item.
    VersionNotFound(ContentId, VersionNumber),
    /// Two appends raced for the same next version number; caller should
    /// re-read the current max and retry.
    ConcurrentConflict(ContentId),
    /// Attempt to prune a version inside the retention window.
    RetentionViolation(VersionNumber),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl VersionError {
    pub fn content_not_found(id: ContentId) -> Self {
        VersionError::ContentNotFound(id)
    }

    pub fn version_not_found(id: ContentId, number: VersionNumber) -> Self {
        VersionError::VersionNotFound(id, number)
    }

    pub fn concurrent_conflict(id: ContentId) -> Self {
        VersionError::ConcurrentConflict(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        VersionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            VersionError::ContentNotFound(_) => ErrorCode::ContentNotFound,
            VersionError::VersionNotFound(_, _) => ErrorCode::VersionNotFound,
            VersionError::ConcurrentConflict(_) => ErrorCode::ConcurrentVersionConflict,
            VersionError::RetentionViolation(_) => ErrorCode::RetentionViolation,
            VersionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            VersionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            VersionError::ContentNotFound(id) => format!("No versions for content: {}", id),
            VersionError::VersionNotFound(id, number) => {
                format!("Version {} not found for content {}", number, id)
            }
            VersionError::ConcurrentConflict(id) => {
                format!("Concurrent version append for content {}", id)
            }
            VersionError::RetentionViolation(number) => {
                format!("Version {} is inside the retention window", number)
            }
            VersionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            VersionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for VersionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for VersionError {}

impl From<DomainError> for VersionError {
    fn from(err: DomainError) -> Self {
        // Typed variants carry ids the bare code cannot recover; handlers
        // construct those directly at the call site. This conversion is the
        // fallback for plumbing errors crossing the port boundary.
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                VersionError::ValidationFailed {
                    field: err
                        .details
                        .get("field")
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string()),
                    message: err.to_string(),
                }
            }
            _ => VersionError::Infrastructure(err.to_string()),
        }
    }
}
