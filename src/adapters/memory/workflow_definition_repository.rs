//! In-memory workflow definition store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{CampaignId, DomainError, WorkflowId};
use crate::domain::workflow::ApprovalWorkflowDefinition;
use crate::ports::WorkflowDefinitionRepository;

/// In-memory definition store.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned.
pub struct InMemoryWorkflowDefinitionRepository {
    definitions: RwLock<HashMap<WorkflowId, ApprovalWorkflowDefinition>>,
}

impl InMemoryWorkflowDefinitionRepository {
    pub fn new() -> Self {
        Self {
            definitions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryWorkflowDefinitionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowDefinitionRepository for InMemoryWorkflowDefinitionRepository {
    async fn save(&self, definition: &ApprovalWorkflowDefinition) -> Result<(), DomainError> {
        self.definitions
            .write()
            .expect("InMemoryWorkflowDefinitionRepository: write lock poisoned")
            .insert(*definition.id(), definition.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &WorkflowId,
    ) -> Result<Option<ApprovalWorkflowDefinition>, DomainError> {
        let store = self
            .definitions
            .read()
            .expect("InMemoryWorkflowDefinitionRepository: lock poisoned");
        Ok(store.get(id).cloned())
    }

    async fn find_current_for_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Option<ApprovalWorkflowDefinition>, DomainError> {
        let store = self
            .definitions
            .read()
            .expect("InMemoryWorkflowDefinitionRepository: lock poisoned");
        Ok(store
            .values()
            .filter(|d| d.campaign_id() == campaign_id)
            .max_by_key(|d| *d.created_at().as_datetime())
            .cloned())
    }
}
