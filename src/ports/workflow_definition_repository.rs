//! Workflow definition repository port.
//!
//! Definitions are immutable after creation, so the port has no update:
//! revising a campaign's chain means saving a new definition.

use async_trait::async_trait;

use crate::domain::foundation::{CampaignId, DomainError, WorkflowId};
use crate::domain::workflow::ApprovalWorkflowDefinition;

/// Repository port for approval workflow definitions.
#[async_trait]
pub trait WorkflowDefinitionRepository: Send + Sync {
    /// Persist a new definition.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, definition: &ApprovalWorkflowDefinition) -> Result<(), DomainError>;

    /// Find a definition by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(
        &self,
        id: &WorkflowId,
    ) -> Result<Option<ApprovalWorkflowDefinition>, DomainError>;

    /// Find the most recently created definition for a campaign.
    ///
    /// New submissions bind to this one; in-flight requests keep the
    /// definition they started with.
    async fn find_current_for_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Option<ApprovalWorkflowDefinition>, DomainError>;
}
