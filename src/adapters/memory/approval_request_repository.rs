//! In-memory approval request store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{ContentId, DomainError, ErrorCode, RequestId};
use crate::domain::workflow::ApprovalRequest;
use crate::ports::ApprovalRequestRepository;

/// In-memory ApprovalRequest store.
///
/// The uniqueness check for active requests and the revision comparison on
/// update both run under a write lock, matching the transactional behavior
/// of the Postgres adapter.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned.
pub struct InMemoryApprovalRequestRepository {
    requests: RwLock<HashMap<RequestId, ApprovalRequest>>,
}

impl InMemoryApprovalRequestRepository {
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryApprovalRequestRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApprovalRequestRepository for InMemoryApprovalRequestRepository {
    async fn insert_active(&self, request: &ApprovalRequest) -> Result<(), DomainError> {
        let mut store = self
            .requests
            .write()
            .expect("InMemoryApprovalRequestRepository: write lock poisoned");

        let has_active = store
            .values()
            .any(|r| r.content_id() == request.content_id() && r.is_active());
        if has_active {
            return Err(DomainError::new(
                ErrorCode::DuplicateActiveRequest,
                format!(
                    "Content {} already has an active approval request",
                    request.content_id()
                ),
            ));
        }

        store.insert(*request.id(), request.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<ApprovalRequest>, DomainError> {
        let store = self
            .requests
            .read()
            .expect("InMemoryApprovalRequestRepository: lock poisoned");
        Ok(store.get(id).cloned())
    }

    async fn find_active_by_content(
        &self,
        content_id: &ContentId,
    ) -> Result<Option<ApprovalRequest>, DomainError> {
        let store = self
            .requests
            .read()
            .expect("InMemoryApprovalRequestRepository: lock poisoned");
        Ok(store
            .values()
            .find(|r| r.content_id() == content_id && r.is_active())
            .cloned())
    }

    async fn find_latest_by_content(
        &self,
        content_id: &ContentId,
    ) -> Result<Option<ApprovalRequest>, DomainError> {
        let store = self
            .requests
            .read()
            .expect("InMemoryApprovalRequestRepository: lock poisoned");
        Ok(store
            .values()
            .filter(|r| r.content_id() == content_id)
            .max_by_key(|r| *r.submitted_at().as_datetime())
            .cloned())
    }

    async fn update(
        &self,
        request: &ApprovalRequest,
        expected_revision: u64,
    ) -> Result<(), DomainError> {
        let mut store = self
            .requests
            .write()
            .expect("InMemoryApprovalRequestRepository: write lock poisoned");

        let Some(stored) = store.get(request.id()) else {
            return Err(DomainError::new(
                ErrorCode::RequestNotFound,
                format!("Approval request not found: {}", request.id()),
            ));
        };
        if stored.revision() != expected_revision {
            return Err(DomainError::new(
                ErrorCode::ConcurrentUpdateConflict,
                format!(
                    "Request {} was modified concurrently (expected revision {}, found {})",
                    request.id(),
                    expected_revision,
                    stored.revision()
                ),
            ));
        }

        store.insert(*request.id(), request.clone());
        Ok(())
    }
}
