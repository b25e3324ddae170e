//! Approver directory port - read-side lookup of role membership.
//!
//! Role assignment lives in the external identity system; this port only
//! asks questions of it. Answers feed stage eligibility checks and
//! notification recipient lists.

use async_trait::async_trait;

use crate::domain::foundation::{ApproverRole, DomainError, UserId};

/// Port for resolving users to approver roles.
#[async_trait]
pub trait ApproverDirectory: Send + Sync {
    /// All users currently holding a role.
    async fn users_with_role(&self, role: &ApproverRole) -> Result<Vec<UserId>, DomainError>;

    /// Whether a user currently holds a role.
    async fn user_has_role(
        &self,
        user_id: &UserId,
        role: &ApproverRole,
    ) -> Result<bool, DomainError>;
}
