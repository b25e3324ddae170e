//! Approval action repository port - the immutable audit trail.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, RequestId};
use crate::domain::workflow::ApprovalAction;

/// Repository port for the append-only action log.
///
/// Actions are never updated or deleted; the log is the audit record of
/// every decision taken on a request.
#[async_trait]
pub trait ApprovalActionRepository: Send + Sync {
    /// Record an action.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn record(&self, action: &ApprovalAction) -> Result<(), DomainError>;

    /// List all actions for a request in the order they were recorded.
    async fn list_for_request(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<ApprovalAction>, DomainError>;
}
