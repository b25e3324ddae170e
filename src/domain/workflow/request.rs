//! ApprovalRequest aggregate - the per-request state machine.
//!
//! A request pins the exact content version under review at submission time,
//! so later edits never silently change what an approver signed off on.
//!
//! # Invariants
//!
//! - at most one Pending request exists per content_id (enforced at the
//!   repository boundary via transactional check-and-insert)
//! - terminal requests (Approved/Rejected/Cancelled) accept no further actions
//! - `current_stage` only moves forward, one stage at a time
//! - `revision` increments on every mutation; repositories use it for
//!   optimistic concurrency so two racing approvals can never double-advance

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ContentId, DomainError, ErrorCode, RequestId, StateMachine, Timestamp, UserId, WorkflowId,
};
use crate::domain::version::VersionNumber;

use super::{ApprovalStatus, ApprovalWorkflowDefinition, StageNumber};

/// Result of a successful stage sign-off or skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The request moved to the named stage.
    Advanced(StageNumber),
    /// The last stage signed off; the request is now Approved.
    Completed,
}

/// One in-flight (or settled) pass of a content version through a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    id: RequestId,
    content_id: ContentId,
    workflow_id: WorkflowId,
    version_number: VersionNumber,
    current_stage: StageNumber,
    status: ApprovalStatus,
    submitted_by: UserId,
    submitted_at: Timestamp,
    updated_at: Timestamp,
    revision: u64,
}

impl ApprovalRequest {
    /// Creates a fresh request at Pending, stage 1.
    pub fn new(
        id: RequestId,
        content_id: ContentId,
        workflow_id: WorkflowId,
        version_number: VersionNumber,
        submitted_by: UserId,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            content_id,
            workflow_id,
            version_number,
            current_stage: StageNumber::first(),
            status: ApprovalStatus::Pending,
            submitted_by,
            submitted_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    /// Reconstitute a request from persistence (no validation, no events).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: RequestId,
        content_id: ContentId,
        workflow_id: WorkflowId,
        version_number: VersionNumber,
        current_stage: StageNumber,
        status: ApprovalStatus,
        submitted_by: UserId,
        submitted_at: Timestamp,
        updated_at: Timestamp,
        revision: u64,
    ) -> Self {
        Self {
            id,
            content_id,
            workflow_id,
            version_number,
            current_stage,
            status,
            submitted_by,
            submitted_at,
            updated_at,
            revision,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }

    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }

    /// The content version pinned at submission.
    pub fn version_number(&self) -> VersionNumber {
        self.version_number
    }

    pub fn current_stage(&self) -> StageNumber {
        self.current_stage
    }

    pub fn status(&self) -> ApprovalStatus {
        self.status
    }

    pub fn submitted_by(&self) -> &UserId {
        &self.submitted_by
    }

    pub fn submitted_at(&self) -> &Timestamp {
        &self.submitted_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Optimistic-locking token; incremented on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns true while the request accepts actions.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// The pin goes stale when the content has moved past the reviewed
    /// version. Approvers see this and can knowingly reject or request
    /// changes against outdated content.
    pub fn is_stale(&self, latest_version: Option<VersionNumber>) -> bool {
        latest_version != Some(self.version_number)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Signs off the current stage and advances (or completes).
    ///
    /// # Errors
    ///
    /// - `RequestTerminal` if the request is no longer pending
    /// - `StageNotReached` if `acted_stage` is not the current stage
    pub fn approve_stage(
        &mut self,
        acted_stage: StageNumber,
        definition: &ApprovalWorkflowDefinition,
    ) -> Result<StageOutcome, DomainError> {
        self.ensure_pending()?;
        self.ensure_stage(acted_stage)?;
        self.advance(definition)
    }

    /// Skips the current stage; only allowed when the stage is optional.
    ///
    /// # Errors
    ///
    /// - `RequestTerminal` if the request is no longer pending
    /// - `StageNotReached` if `acted_stage` is not the current stage
    /// - `StageRequired` if the stage blocks advancement
    pub fn skip_stage(
        &mut self,
        acted_stage: StageNumber,
        definition: &ApprovalWorkflowDefinition,
    ) -> Result<StageOutcome, DomainError> {
        self.ensure_pending()?;
        self.ensure_stage(acted_stage)?;

        let stage = definition.stage(self.current_stage).ok_or_else(|| {
            DomainError::new(
                ErrorCode::MalformedStageConfig,
                format!("Definition has no {}", self.current_stage),
            )
        })?;
        if stage.is_required() {
            return Err(DomainError::new(
                ErrorCode::StageRequired,
                format!("{} is required and cannot be skipped", self.current_stage),
            ));
        }

        self.advance(definition)
    }

    /// Rejects the request. Terminal; a rework is a new version plus an
    /// entirely new request, never a resumption of this one.
    ///
    /// # Errors
    ///
    /// - `RequestTerminal` if the request is no longer pending
    /// - `StageNotReached` if `acted_stage` is not the current stage
    pub fn reject(&mut self, acted_stage: StageNumber) -> Result<(), DomainError> {
        self.ensure_pending()?;
        self.ensure_stage(acted_stage)?;

        self.status = self.status.transition_to(ApprovalStatus::Rejected)?;
        self.touch();
        Ok(())
    }

    /// Records that changes were requested: the request stays pending at the
    /// same stage. May recur any number of times.
    ///
    /// # Errors
    ///
    /// - `RequestTerminal` if the request is no longer pending
    /// - `StageNotReached` if `acted_stage` is not the current stage
    pub fn note_changes_requested(&mut self, acted_stage: StageNumber) -> Result<(), DomainError> {
        self.ensure_pending()?;
        self.ensure_stage(acted_stage)?;
        self.touch();
        Ok(())
    }

    /// Cancels the request.
    ///
    /// # Errors
    ///
    /// - `RequestTerminal` if the request is no longer pending
    /// - `Forbidden` unless the actor submitted the request or carries
    ///   cancellation rights granted by the external authorization layer
    pub fn cancel(&mut self, actor: &UserId, has_cancellation_rights: bool) -> Result<(), DomainError> {
        self.ensure_pending()?;

        if actor != &self.submitted_by && !has_cancellation_rights {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the submitter or an authorized role may cancel an approval request",
            ));
        }

        self.status = self.status.transition_to(ApprovalStatus::Cancelled)?;
        self.touch();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn advance(&mut self, definition: &ApprovalWorkflowDefinition) -> Result<StageOutcome, DomainError> {
        let outcome = if definition.is_final_stage(self.current_stage) {
            self.status = self.status.transition_to(ApprovalStatus::Approved)?;
            StageOutcome::Completed
        } else {
            self.current_stage = self.current_stage.next();
            StageOutcome::Advanced(self.current_stage)
        };
        self.touch();
        Ok(outcome)
    }

    fn ensure_pending(&self) -> Result<(), DomainError> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::RequestTerminal,
                format!("Request is {} and accepts no further actions", self.status),
            ))
        }
    }

    fn ensure_stage(&self, acted_stage: StageNumber) -> Result<(), DomainError> {
        if acted_stage == self.current_stage {
            return Ok(());
        }
        let relation = if acted_stage > self.current_stage {
            "has not been reached"
        } else {
            "was already passed"
        };
        Err(DomainError::new(
            ErrorCode::StageNotReached,
            format!(
                "{} {}; request is at {}",
                acted_stage, relation, self.current_stage
            ),
        ))
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ApproverRole, CampaignId};
    use crate::domain::workflow::ApprovalStage;

    fn submitter() -> UserId {
        UserId::new("submitter-1").unwrap()
    }

    fn stage_n(n: u32, role: &str, required: bool) -> ApprovalStage {
        ApprovalStage::new(
            StageNumber::new(n).unwrap(),
            ApproverRole::new(role).unwrap(),
            None,
            required,
        )
    }

    fn definition() -> ApprovalWorkflowDefinition {
        ApprovalWorkflowDefinition::new(
            WorkflowId::new(),
            CampaignId::new(),
            vec![
                stage_n(1, "creator", true),
                stage_n(2, "editor", false),
                stage_n(3, "marketer", true),
            ],
        )
        .unwrap()
    }

    fn request(definition: &ApprovalWorkflowDefinition) -> ApprovalRequest {
        ApprovalRequest::new(
            RequestId::new(),
            ContentId::new(),
            *definition.id(),
            VersionNumber::first(),
            submitter(),
        )
    }

    fn nth(n: u32) -> StageNumber {
        StageNumber::new(n).unwrap()
    }

    #[test]
    fn new_request_is_pending_at_stage_one() {
        let def = definition();
        let req = request(&def);
        assert_eq!(req.status(), ApprovalStatus::Pending);
        assert_eq!(req.current_stage(), StageNumber::first());
        assert_eq!(req.revision(), 0);
    }

    #[test]
    fn approve_advances_one_stage() {
        let def = definition();
        let mut req = request(&def);

        let outcome = req.approve_stage(nth(1), &def).unwrap();
        assert_eq!(outcome, StageOutcome::Advanced(nth(2)));
        assert_eq!(req.current_stage(), nth(2));
        assert_eq!(req.status(), ApprovalStatus::Pending);
        assert_eq!(req.revision(), 1);
    }

    #[test]
    fn approving_final_stage_completes_request() {
        let def = definition();
        let mut req = request(&def);
        req.approve_stage(nth(1), &def).unwrap();
        req.approve_stage(nth(2), &def).unwrap();

        let outcome = req.approve_stage(nth(3), &def).unwrap();
        assert_eq!(outcome, StageOutcome::Completed);
        assert_eq!(req.status(), ApprovalStatus::Approved);
    }

    #[test]
    fn acting_on_future_stage_fails_with_stage_not_reached() {
        let def = definition();
        let mut req = request(&def);

        let err = req.approve_stage(nth(2), &def).unwrap_err();
        assert_eq!(err.code, ErrorCode::StageNotReached);
        assert!(err.message.contains("has not been reached"));
    }

    #[test]
    fn acting_on_passed_stage_fails_with_stage_not_reached() {
        let def = definition();
        let mut req = request(&def);
        req.approve_stage(nth(1), &def).unwrap();

        let err = req.approve_stage(nth(1), &def).unwrap_err();
        assert_eq!(err.code, ErrorCode::StageNotReached);
        assert!(err.message.contains("was already passed"));
    }

    #[test]
    fn reject_is_terminal() {
        let def = definition();
        let mut req = request(&def);

        req.reject(nth(1)).unwrap();
        assert_eq!(req.status(), ApprovalStatus::Rejected);

        let err = req.approve_stage(nth(1), &def).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestTerminal);
    }

    #[test]
    fn changes_requested_keeps_request_pending_and_may_recur() {
        let def = definition();
        let mut req = request(&def);

        req.note_changes_requested(nth(1)).unwrap();
        req.note_changes_requested(nth(1)).unwrap();
        req.note_changes_requested(nth(1)).unwrap();

        assert_eq!(req.status(), ApprovalStatus::Pending);
        assert_eq!(req.current_stage(), nth(1));
        assert_eq!(req.revision(), 3);
    }

    #[test]
    fn skip_advances_past_optional_stage() {
        let def = definition();
        let mut req = request(&def);
        req.approve_stage(nth(1), &def).unwrap();

        let outcome = req.skip_stage(nth(2), &def).unwrap();
        assert_eq!(outcome, StageOutcome::Advanced(nth(3)));
    }

    #[test]
    fn skip_refuses_required_stage() {
        let def = definition();
        let mut req = request(&def);

        let err = req.skip_stage(nth(1), &def).unwrap_err();
        assert_eq!(err.code, ErrorCode::StageRequired);
        assert_eq!(req.current_stage(), nth(1));
    }

    #[test]
    fn submitter_can_cancel() {
        let def = definition();
        let mut req = request(&def);

        req.cancel(&submitter(), false).unwrap();
        assert_eq!(req.status(), ApprovalStatus::Cancelled);
    }

    #[test]
    fn stranger_cannot_cancel_without_rights() {
        let def = definition();
        let mut req = request(&def);
        let stranger = UserId::new("someone-else").unwrap();

        let err = req.cancel(&stranger, false).unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(req.status(), ApprovalStatus::Pending);
    }

    #[test]
    fn authorized_role_can_cancel() {
        let def = definition();
        let mut req = request(&def);
        let admin = UserId::new("campaign-admin").unwrap();

        req.cancel(&admin, true).unwrap();
        assert_eq!(req.status(), ApprovalStatus::Cancelled);
    }

    #[test]
    fn cancel_after_terminal_fails() {
        let def = definition();
        let mut req = request(&def);
        req.reject(nth(1)).unwrap();

        let err = req.cancel(&submitter(), false).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestTerminal);
    }

    #[test]
    fn staleness_tracks_latest_version() {
        let def = definition();
        let req = request(&def);

        assert!(!req.is_stale(Some(VersionNumber::first())));
        assert!(req.is_stale(Some(VersionNumber::first().next())));
        assert!(req.is_stale(None));
    }

    #[test]
    fn every_mutation_bumps_revision() {
        let def = definition();
        let mut req = request(&def);
        assert_eq!(req.revision(), 0);

        req.note_changes_requested(nth(1)).unwrap();
        assert_eq!(req.revision(), 1);

        req.approve_stage(nth(1), &def).unwrap();
        assert_eq!(req.revision(), 2);

        req.reject(nth(2)).unwrap();
        assert_eq!(req.revision(), 3);
    }
}
