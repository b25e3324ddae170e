//! Approval workflow definitions - the static stage configuration.
//!
//! Definitions are immutable after creation: editing a campaign's chain
//! produces a new definition, and in-flight requests keep referencing the
//! definition they started with, so stage sets never shift mid-flight.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    ApproverRole, CampaignId, Timestamp, UserId, ValidationError, WorkflowId,
};

/// 1-based position of a stage within a workflow definition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StageNumber(u32);

impl StageNumber {
    /// The first stage of any workflow.
    pub fn first() -> Self {
        Self(1)
    }

    /// Creates a stage number, rejecting zero.
    pub fn new(n: u32) -> Result<Self, ValidationError> {
        if n == 0 {
            return Err(ValidationError::invalid_format(
                "stage_number",
                "stage numbers start at 1",
            ));
        }
        Ok(Self(n))
    }

    /// Returns the next stage number.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw number.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for StageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {}", self.0)
    }
}

/// One ordered step in an approval chain.
///
/// Eligibility: when `approver_id` is set, only that user may act; otherwise
/// any holder of `approver_role` is eligible. Required stages block
/// advancement; optional stages are advisory and may be skipped by an
/// external scheduling collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStage {
    stage_number: StageNumber,
    approver_role: ApproverRole,
    approver_id: Option<UserId>,
    required: bool,
}

impl ApprovalStage {
    /// Creates a stage descriptor.
    pub fn new(
        stage_number: StageNumber,
        approver_role: ApproverRole,
        approver_id: Option<UserId>,
        required: bool,
    ) -> Self {
        Self {
            stage_number,
            approver_role,
            approver_id,
            required,
        }
    }

    /// Returns the stage number.
    pub fn stage_number(&self) -> StageNumber {
        self.stage_number
    }

    /// Returns the required role.
    pub fn approver_role(&self) -> &ApproverRole {
        &self.approver_role
    }

    /// Returns the pinned approver, if any.
    pub fn approver_id(&self) -> Option<&UserId> {
        self.approver_id.as_ref()
    }

    /// Returns whether this stage blocks advancement.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Checks whether the given actor may sign off at this stage.
    pub fn is_eligible(&self, actor_id: &UserId, actor_role: &ApproverRole) -> bool {
        match &self.approver_id {
            Some(pinned) => pinned == actor_id,
            None => &self.approver_role == actor_role,
        }
    }
}

/// Immutable, ordered stage configuration for a campaign's approval chain.
///
/// # Invariants
///
/// - at least one stage
/// - stage numbers are unique and form a contiguous 1..N range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalWorkflowDefinition {
    id: WorkflowId,
    campaign_id: CampaignId,
    stages: Vec<ApprovalStage>,
    created_at: Timestamp,
}

impl ApprovalWorkflowDefinition {
    /// Creates a definition, validating the stage sequence.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if there are no stages
    /// - `InvalidFormat` if stage numbers are not exactly 1..N in order
    pub fn new(
        id: WorkflowId,
        campaign_id: CampaignId,
        stages: Vec<ApprovalStage>,
    ) -> Result<Self, ValidationError> {
        Self::validate_stages(&stages)?;
        Ok(Self {
            id,
            campaign_id,
            stages,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitute a definition from persistence (no validation).
    pub fn reconstitute(
        id: WorkflowId,
        campaign_id: CampaignId,
        stages: Vec<ApprovalStage>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            campaign_id,
            stages,
            created_at,
        }
    }

    /// Returns the workflow ID.
    pub fn id(&self) -> &WorkflowId {
        &self.id
    }

    /// Returns the owning campaign.
    pub fn campaign_id(&self) -> &CampaignId {
        &self.campaign_id
    }

    /// Returns the ordered stages.
    pub fn stages(&self) -> &[ApprovalStage] {
        &self.stages
    }

    /// Returns when the definition was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns the number of stages.
    pub fn total_stages(&self) -> u32 {
        self.stages.len() as u32
    }

    /// Looks up a stage by number.
    pub fn stage(&self, number: StageNumber) -> Option<&ApprovalStage> {
        self.stages.get((number.get() - 1) as usize)
    }

    /// Returns true if the given stage is the last one.
    pub fn is_final_stage(&self, number: StageNumber) -> bool {
        number.get() == self.total_stages()
    }

    fn validate_stages(stages: &[ApprovalStage]) -> Result<(), ValidationError> {
        if stages.is_empty() {
            return Err(ValidationError::empty_field("stages"));
        }
        for (index, stage) in stages.iter().enumerate() {
            let expected = (index + 1) as u32;
            if stage.stage_number().get() != expected {
                return Err(ValidationError::invalid_format(
                    "stages",
                    format!(
                        "stage numbers must be contiguous from 1; position {} has {}",
                        index + 1,
                        stage.stage_number().get()
                    ),
                ));
            }
        }
        Ok(())
    }
}
