//! Approval-engine-specific error types.

use crate::domain::foundation::{ContentId, DomainError, ErrorCode, RequestId, WorkflowId};
use crate::domain::version::VersionNumber;

/// Errors surfaced by approval-engine operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Approval request does not exist.
    RequestNotFound(RequestId),
    /// Workflow definition does not exist.
    WorkflowNotFound(WorkflowId),
    /// Content item does not exist.
    ContentNotFound(ContentId),
    /// The version to pin does not exist for the content item.
    VersionNotFound(ContentId, VersionNumber),
    /// Content already has an active request; it must settle first.
    DuplicateActiveRequest(ContentId),
    /// The request has reached a terminal status.
    RequestTerminal(String),
    /// Action targeted a stage that is not the current one.
    StageNotReached(String),
    /// The stage is required and cannot be skipped.
    StageRequired(String),
    /// Actor holds neither the stage's role nor its pinned approver slot.
    NotEligibleApprover(String),
    /// Rejection submitted without feedback.
    FeedbackRequired,
    /// The approver already recorded a decisive action at this stage.
    DuplicateAction(String),
    /// Actor may not perform this operation.
    Forbidden(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// A concurrent writer got there first; re-read and retry.
    Conflict(String),
    /// Infrastructure error.
    Infrastructure(String),
}

impl WorkflowError {
    pub fn request_not_found(id: RequestId) -> Self {
        WorkflowError::RequestNotFound(id)
    }

    pub fn workflow_not_found(id: WorkflowId) -> Self {
        WorkflowError::WorkflowNotFound(id)
    }

    pub fn duplicate_active_request(id: ContentId) -> Self {
        WorkflowError::DuplicateActiveRequest(id)
    }

    pub fn not_eligible(message: impl Into<String>) -> Self {
        WorkflowError::NotEligibleApprover(message.into())
    }

    pub fn duplicate_action(message: impl Into<String>) -> Self {
        WorkflowError::DuplicateAction(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        WorkflowError::Conflict(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        WorkflowError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            WorkflowError::RequestNotFound(_) => ErrorCode::RequestNotFound,
            WorkflowError::WorkflowNotFound(_) => ErrorCode::WorkflowNotFound,
            WorkflowError::ContentNotFound(_) => ErrorCode::ContentNotFound,
            WorkflowError::VersionNotFound(_, _) => ErrorCode::VersionNotFound,
            WorkflowError::DuplicateActiveRequest(_) => ErrorCode::DuplicateActiveRequest,
            WorkflowError::RequestTerminal(_) => ErrorCode::RequestTerminal,
            WorkflowError::StageNotReached(_) => ErrorCode::StageNotReached,
            WorkflowError::StageRequired(_) => ErrorCode::StageRequired,
            WorkflowError::NotEligibleApprover(_) => ErrorCode::Forbidden,
            WorkflowError::FeedbackRequired => ErrorCode::FeedbackRequired,
            WorkflowError::DuplicateAction(_) => ErrorCode::DuplicateAction,
            WorkflowError::Forbidden(_) => ErrorCode::Forbidden,
            WorkflowError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            WorkflowError::Conflict(_) => ErrorCode::ConcurrentUpdateConflict,
            WorkflowError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            WorkflowError::RequestNotFound(id) => format!("Approval request not found: {}", id),
            WorkflowError::WorkflowNotFound(id) => format!("Workflow definition not found: {}", id),
            WorkflowError::ContentNotFound(id) => format!("Content not found: {}", id),
            WorkflowError::VersionNotFound(id, number) => {
                format!("Version {} not found for content {}", number, id)
            }
            WorkflowError::DuplicateActiveRequest(id) => {
                format!("Content {} already has an active approval request", id)
            }
            WorkflowError::RequestTerminal(msg)
            | WorkflowError::StageNotReached(msg)
            | WorkflowError::StageRequired(msg)
            | WorkflowError::NotEligibleApprover(msg)
            | WorkflowError::DuplicateAction(msg)
            | WorkflowError::Forbidden(msg)
            | WorkflowError::Conflict(msg) => msg.clone(),
            WorkflowError::FeedbackRequired => {
                "Rejection requires feedback for the submitter".to_string()
            }
            WorkflowError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            WorkflowError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for WorkflowError {}

impl From<DomainError> for WorkflowError {
    fn from(err: DomainError) -> Self {
        // Variants keyed only on a message can be recovered from the code;
        // id-carrying variants are constructed directly at the call site.
        match err.code {
            ErrorCode::RequestTerminal => WorkflowError::RequestTerminal(err.message),
            ErrorCode::StageNotReached => WorkflowError::StageNotReached(err.message),
            ErrorCode::StageRequired => WorkflowError::StageRequired(err.message),
            ErrorCode::FeedbackRequired => WorkflowError::FeedbackRequired,
            ErrorCode::DuplicateAction => WorkflowError::DuplicateAction(err.message),
            ErrorCode::Forbidden => WorkflowError::Forbidden(err.message),
            ErrorCode::ConcurrentUpdateConflict => WorkflowError::Conflict(err.message),
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat
            | ErrorCode::MalformedStageConfig => WorkflowError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => WorkflowError::Infrastructure(err.message),
        }
    }
}
