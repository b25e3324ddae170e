//! In-memory approver directory for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{ApproverRole, DomainError, UserId};
use crate::ports::ApproverDirectory;

/// In-memory role membership directory.
///
/// Tests seed assignments with `assign`; the engine only ever reads.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned.
pub struct InMemoryApproverDirectory {
    assignments: RwLock<HashMap<ApproverRole, Vec<UserId>>>,
}

impl InMemoryApproverDirectory {
    pub fn new() -> Self {
        Self {
            assignments: RwLock::new(HashMap::new()),
        }
    }

    /// Grants a role to a user.
    pub fn assign(&self, user_id: UserId, role: ApproverRole) {
        let mut assignments = self
            .assignments
            .write()
            .expect("InMemoryApproverDirectory: write lock poisoned");
        let holders = assignments.entry(role).or_default();
        if !holders.contains(&user_id) {
            holders.push(user_id);
        }
    }
}

impl Default for InMemoryApproverDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApproverDirectory for InMemoryApproverDirectory {
    async fn users_with_role(&self, role: &ApproverRole) -> Result<Vec<UserId>, DomainError> {
        let assignments = self
            .assignments
            .read()
            .expect("InMemoryApproverDirectory: lock poisoned");
        Ok(assignments.get(role).cloned().unwrap_or_default())
    }

    async fn user_has_role(
        &self,
        user_id: &UserId,
        role: &ApproverRole,
    ) -> Result<bool, DomainError> {
        let assignments = self
            .assignments
            .read()
            .expect("InMemoryApproverDirectory: lock poisoned");
        Ok(assignments
            .get(role)
            .map(|holders| holders.contains(user_id))
            .unwrap_or(false))
    }
}
