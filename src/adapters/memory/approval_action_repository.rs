//! In-memory approval action log for testing.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, RequestId};
use crate::domain::workflow::ApprovalAction;
use crate::ports::ApprovalActionRepository;

/// In-memory append-only action log.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned.
pub struct InMemoryApprovalActionRepository {
    actions: RwLock<Vec<ApprovalAction>>,
}

impl InMemoryApprovalActionRepository {
    pub fn new() -> Self {
        Self {
            actions: RwLock::new(Vec::new()),
        }
    }

    /// All recorded actions (for test assertions).
    pub fn all(&self) -> Vec<ApprovalAction> {
        self.actions
            .read()
            .expect("InMemoryApprovalActionRepository: lock poisoned")
            .clone()
    }
}

impl Default for InMemoryApprovalActionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApprovalActionRepository for InMemoryApprovalActionRepository {
    async fn record(&self, action: &ApprovalAction) -> Result<(), DomainError> {
        self.actions
            .write()
            .expect("InMemoryApprovalActionRepository: write lock poisoned")
            .push(action.clone());
        Ok(())
    }

    async fn list_for_request(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<ApprovalAction>, DomainError> {
        let actions = self
            .actions
            .read()
            .expect("InMemoryApprovalActionRepository: lock poisoned");
        Ok(actions
            .iter()
            .filter(|a| a.request_id() == request_id)
            .cloned()
            .collect())
    }
}
