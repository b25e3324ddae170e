//! RecordApprovalActionHandler - applies an approver's decision to a request.
//!
//! The read-check-mutate-persist cycle runs under the conflict retry helper:
//! a losing writer in a concurrent double-approve re-reads the advanced
//! request and surfaces `StageNotReached` instead of double-advancing.

use std::sync::Arc;

use crate::application::retry::{with_conflict_retry, MAX_CONFLICT_ATTEMPTS};
use crate::domain::foundation::{
    ActionId, CommandMetadata, EventEnvelope, EventId, RequestId, SerializableDomainEvent,
    Timestamp,
};
use crate::domain::workflow::{
    stage_recipients, ActionKind, ApprovalAction, ApprovalChangesRequested, ApprovalGranted,
    ApprovalRejected, ApprovalRequest, ApprovalStageAdvanced, ApprovalWorkflowDefinition,
    ApproverNotification, NotificationKind, StageNumber, StageOutcome, WorkflowError,
};
use crate::ports::{
    ApprovalActionRepository, ApprovalRequestRepository, ApproverDirectory, EventPublisher,
    WorkflowDefinitionRepository,
};

/// Command recording one approver decision at one stage.
#[derive(Debug, Clone)]
pub struct RecordApprovalActionCommand {
    pub request_id: RequestId,
    /// The stage the approver believes they are acting on. Anything other
    /// than the current stage fails with `StageNotReached`.
    pub stage_number: StageNumber,
    pub action: ActionKind,
    pub feedback: Option<String>,
}

/// Result of a recorded action.
#[derive(Debug, Clone)]
pub struct RecordApprovalActionResult {
    pub request: ApprovalRequest,
    pub action: ApprovalAction,
    /// Present for approvals; `None` for reject and request-changes.
    pub outcome: Option<StageOutcome>,
}

/// Handler for recording approval actions.
pub struct RecordApprovalActionHandler {
    requests: Arc<dyn ApprovalRequestRepository>,
    definitions: Arc<dyn WorkflowDefinitionRepository>,
    actions: Arc<dyn ApprovalActionRepository>,
    directory: Arc<dyn ApproverDirectory>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RecordApprovalActionHandler {
    pub fn new(
        requests: Arc<dyn ApprovalRequestRepository>,
        definitions: Arc<dyn WorkflowDefinitionRepository>,
        actions: Arc<dyn ApprovalActionRepository>,
        directory: Arc<dyn ApproverDirectory>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            requests,
            definitions,
            actions,
            directory,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordApprovalActionCommand,
        metadata: CommandMetadata,
    ) -> Result<RecordApprovalActionResult, WorkflowError> {
        with_conflict_retry(MAX_CONFLICT_ATTEMPTS, || self.try_handle(&cmd, &metadata)).await
    }

    async fn try_handle(
        &self,
        cmd: &RecordApprovalActionCommand,
        metadata: &CommandMetadata,
    ) -> Result<RecordApprovalActionResult, WorkflowError> {
        let request = self
            .requests
            .find_by_id(&cmd.request_id)
            .await?
            .ok_or(WorkflowError::RequestNotFound(cmd.request_id))?;
        let definition = self
            .definitions
            .find_by_id(request.workflow_id())
            .await?
            .ok_or(WorkflowError::WorkflowNotFound(*request.workflow_id()))?;

        // 1. Apply the transition to a local copy. Terminal requests and
        //    wrong-stage actions fail here before anything is persisted.
        let mut updated = request.clone();
        let expected_revision = updated.revision();
        let outcome = match cmd.action {
            ActionKind::Approve => Some(updated.approve_stage(cmd.stage_number, &definition)?),
            ActionKind::Reject => {
                updated.reject(cmd.stage_number)?;
                None
            }
            ActionKind::RequestChanges => {
                updated.note_changes_requested(cmd.stage_number)?;
                None
            }
        };

        // 2. The actor must be eligible at the acted-on stage
        let stage = definition.stage(cmd.stage_number).ok_or_else(|| {
            WorkflowError::StageNotReached(format!(
                "{} is not part of this workflow",
                cmd.stage_number
            ))
        })?;
        let eligible = match stage.approver_id() {
            Some(pinned) => pinned == &metadata.user_id,
            None => {
                self.directory
                    .user_has_role(&metadata.user_id, stage.approver_role())
                    .await?
            }
        };
        if !eligible {
            return Err(WorkflowError::not_eligible(format!(
                "User '{}' may not act at {} (requires role '{}')",
                metadata.user_id,
                cmd.stage_number,
                stage.approver_role()
            )));
        }

        // 3. Build the audit record; rejection without feedback fails here
        let action = ApprovalAction::new(
            ActionId::new(),
            cmd.request_id,
            cmd.stage_number,
            metadata.user_id.clone(),
            cmd.action,
            cmd.feedback.clone(),
        )?;

        // 4. At most one decisive action per (request, stage, approver)
        if action.action().is_decisive() {
            let prior = self.actions.list_for_request(&cmd.request_id).await?;
            if prior
                .iter()
                .any(|a| a.blocks_duplicate(cmd.stage_number, &metadata.user_id))
            {
                return Err(WorkflowError::duplicate_action(format!(
                    "User '{}' already decided {} of request {}",
                    metadata.user_id, cmd.stage_number, cmd.request_id
                )));
            }
        }

        // 5. Persist: revision-guarded update first, then the audit record.
        //    A conflict here sends the whole attempt back through the retry
        //    loop with freshly read state.
        self.requests.update(&updated, expected_revision).await?;
        self.actions.record(&action).await?;

        tracing::info!(
            request_id = %cmd.request_id,
            stage = %cmd.stage_number,
            action = %cmd.action,
            "approval action recorded"
        );

        // 6. Events and notifications, after the committed transition
        self.publish_for(&updated, &definition, &action, outcome, metadata)
            .await;

        Ok(RecordApprovalActionResult {
            request: updated,
            action,
            outcome,
        })
    }

    async fn publish_for(
        &self,
        request: &ApprovalRequest,
        definition: &ApprovalWorkflowDefinition,
        action: &ApprovalAction,
        outcome: Option<StageOutcome>,
        metadata: &CommandMetadata,
    ) {
        match (action.action(), outcome) {
            (ActionKind::Approve, Some(StageOutcome::Advanced(next_stage))) => {
                let event = ApprovalStageAdvanced {
                    event_id: EventId::new(),
                    request_id: *request.id(),
                    content_id: *request.content_id(),
                    approved_stage: action.stage_number(),
                    current_stage: next_stage,
                    approver_id: metadata.user_id.clone(),
                    occurred_at: Timestamp::now(),
                };
                self.publish_quietly(self.envelope(event.to_envelope(), metadata))
                    .await;
                self.notify_stage(request, definition, next_stage, metadata)
                    .await;
            }
            (ActionKind::Approve, _) => {
                let event = ApprovalGranted {
                    event_id: EventId::new(),
                    request_id: *request.id(),
                    content_id: *request.content_id(),
                    version_number: request.version_number(),
                    approver_id: metadata.user_id.clone(),
                    occurred_at: Timestamp::now(),
                };
                self.publish_quietly(self.envelope(event.to_envelope(), metadata))
                    .await;
                self.notify_submitter(request, NotificationKind::Approved, None, metadata)
                    .await;
            }
            (ActionKind::Reject, _) => {
                let event = ApprovalRejected {
                    event_id: EventId::new(),
                    request_id: *request.id(),
                    content_id: *request.content_id(),
                    rejected_stage: action.stage_number(),
                    approver_id: metadata.user_id.clone(),
                    feedback: action.feedback().unwrap_or_default().to_string(),
                    occurred_at: Timestamp::now(),
                };
                self.publish_quietly(self.envelope(event.to_envelope(), metadata))
                    .await;
                self.notify_submitter(
                    request,
                    NotificationKind::Rejected,
                    action.feedback().map(str::to_string),
                    metadata,
                )
                .await;
            }
            (ActionKind::RequestChanges, _) => {
                let event = ApprovalChangesRequested {
                    event_id: EventId::new(),
                    request_id: *request.id(),
                    content_id: *request.content_id(),
                    stage_number: action.stage_number(),
                    approver_id: metadata.user_id.clone(),
                    feedback: action.feedback().map(str::to_string),
                    occurred_at: Timestamp::now(),
                };
                self.publish_quietly(self.envelope(event.to_envelope(), metadata))
                    .await;
                self.notify_submitter(
                    request,
                    NotificationKind::ChangesRequested,
                    action.feedback().map(str::to_string),
                    metadata,
                )
                .await;
            }
        }
    }

    fn envelope(&self, envelope: EventEnvelope, metadata: &CommandMetadata) -> EventEnvelope {
        envelope
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string())
    }

    async fn notify_stage(
        &self,
        request: &ApprovalRequest,
        definition: &ApprovalWorkflowDefinition,
        stage_number: StageNumber,
        metadata: &CommandMetadata,
    ) {
        let Some(stage) = definition.stage(stage_number) else {
            return;
        };
        let role_holders = match self.directory.users_with_role(stage.approver_role()).await {
            Ok(holders) => holders,
            Err(err) => {
                tracing::warn!(error = %err, stage = %stage_number, "approver lookup failed");
                return;
            }
        };
        for recipient in stage_recipients(stage, role_holders) {
            let notification = ApproverNotification::new(
                *request.id(),
                stage_number,
                recipient,
                NotificationKind::StageReady,
                None,
            );
            self.publish_quietly(self.envelope(notification.to_envelope(), metadata))
                .await;
        }
    }

    async fn notify_submitter(
        &self,
        request: &ApprovalRequest,
        kind: NotificationKind,
        feedback: Option<String>,
        metadata: &CommandMetadata,
    ) {
        let notification = ApproverNotification::new(
            *request.id(),
            request.current_stage(),
            request.submitted_by().clone(),
            kind,
            feedback,
        );
        self.publish_quietly(self.envelope(notification.to_envelope(), metadata))
            .await;
    }

    async fn publish_quietly(&self, envelope: EventEnvelope) {
        if let Err(err) = self.event_publisher.publish(envelope).await {
            tracing::warn!(error = %err, "event publish failed after committed transition");
        }
    }
}
