//! Approval actions - the append-only audit log of approver decisions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ActionId, RequestId, Timestamp, UserId};
use crate::domain::foundation::{DomainError, ErrorCode};

use super::StageNumber;

/// What an approver did at a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Approve,
    Reject,
    RequestChanges,
}

impl ActionKind {
    /// Approve and reject decide a stage; at most one of these may be
    /// recorded per (request, stage, approver). RequestChanges may recur.
    pub fn is_decisive(&self) -> bool {
        matches!(self, ActionKind::Approve | ActionKind::Reject)
    }

    /// Returns the stable string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Approve => "approve",
            ActionKind::Reject => "reject",
            ActionKind::RequestChanges => "request_changes",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded approver decision. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalAction {
    id: ActionId,
    request_id: RequestId,
    stage_number: StageNumber,
    approver_id: UserId,
    action: ActionKind,
    feedback: Option<String>,
    created_at: Timestamp,
}

impl ApprovalAction {
    /// Records a decision.
    ///
    /// # Errors
    ///
    /// - `FeedbackRequired` if action is Reject and feedback is empty or absent
    pub fn new(
        id: ActionId,
        request_id: RequestId,
        stage_number: StageNumber,
        approver_id: UserId,
        action: ActionKind,
        feedback: Option<String>,
    ) -> Result<Self, DomainError> {
        let feedback = feedback.filter(|f| !f.trim().is_empty());
        if action == ActionKind::Reject && feedback.is_none() {
            return Err(DomainError::new(
                ErrorCode::FeedbackRequired,
                "Rejection requires feedback for the submitter",
            ));
        }

        Ok(Self {
            id,
            request_id,
            stage_number,
            approver_id,
            action,
            feedback,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitute an action from persistence (no validation).
    pub fn reconstitute(
        id: ActionId,
        request_id: RequestId,
        stage_number: StageNumber,
        approver_id: UserId,
        action: ActionKind,
        feedback: Option<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            request_id,
            stage_number,
            approver_id,
            action,
            feedback,
            created_at,
        }
    }

    pub fn id(&self) -> &ActionId {
        &self.id
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn stage_number(&self) -> StageNumber {
        self.stage_number
    }

    pub fn approver_id(&self) -> &UserId {
        &self.approver_id
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// True when this action conflicts with recording another decisive
    /// action by the same approver at the same stage.
    pub fn blocks_duplicate(&self, stage: StageNumber, approver: &UserId) -> bool {
        self.action.is_decisive() && self.stage_number == stage && &self.approver_id == approver
    }
}
