//! Approval request repository port (write side).
//!
//! # Design
//!
//! - **One active request per content item**: `insert_active` enforces the
//!   uniqueness transactionally (partial unique index in Postgres, guarded
//!   insert in memory)
//! - **Optimistic concurrency**: `update` compares the stored revision with
//!   the one the caller read; a mismatch means another writer got there first

use async_trait::async_trait;

use crate::domain::foundation::{ContentId, DomainError, RequestId};
use crate::domain::workflow::ApprovalRequest;

/// Repository port for ApprovalRequest aggregate persistence.
#[async_trait]
pub trait ApprovalRequestRepository: Send + Sync {
    /// Insert a new pending request.
    ///
    /// # Errors
    ///
    /// - `DuplicateActiveRequest` if the content already has a pending request
    /// - `DatabaseError` on persistence failure
    async fn insert_active(&self, request: &ApprovalRequest) -> Result<(), DomainError>;

    /// Find a request by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &RequestId) -> Result<Option<ApprovalRequest>, DomainError>;

    /// Find the active (pending) request for a content item, if any.
    async fn find_active_by_content(
        &self,
        content_id: &ContentId,
    ) -> Result<Option<ApprovalRequest>, DomainError>;

    /// Find the most recently submitted request for a content item,
    /// regardless of status.
    async fn find_latest_by_content(
        &self,
        content_id: &ContentId,
    ) -> Result<Option<ApprovalRequest>, DomainError>;

    /// Persist a mutated request, guarded by the revision the caller read.
    ///
    /// # Errors
    ///
    /// - `ConcurrentUpdateConflict` if the stored revision is not
    ///   `expected_revision` (re-read and retry)
    /// - `RequestNotFound` if the request doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(
        &self,
        request: &ApprovalRequest,
        expected_revision: u64,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_request_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ApprovalRequestRepository) {}
    }
}
