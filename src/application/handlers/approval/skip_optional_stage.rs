//! SkipOptionalStageHandler - advances past an optional stage without sign-off.
//!
//! Skips are issued by an external scheduler or policy collaborator, not by
//! approvers; no timeout lives in this core. A skip advances the request
//! exactly like a qualifying approval but records no `ApprovalAction`.

use std::sync::Arc;

use crate::application::retry::{with_conflict_retry, MAX_CONFLICT_ATTEMPTS};
use crate::domain::foundation::{
    CommandMetadata, EventEnvelope, EventId, RequestId, SerializableDomainEvent, Timestamp,
};
use crate::domain::workflow::{
    stage_recipients, ApprovalGranted, ApprovalRequest, ApprovalStageSkipped,
    ApprovalWorkflowDefinition, ApproverNotification, NotificationKind, StageNumber, StageOutcome,
    WorkflowError,
};
use crate::ports::{
    ApprovalRequestRepository, ApproverDirectory, EventPublisher, WorkflowDefinitionRepository,
};

/// Command to skip the current (optional) stage of a request.
#[derive(Debug, Clone)]
pub struct SkipOptionalStageCommand {
    pub request_id: RequestId,
    /// The stage the caller intends to skip; must be the current stage.
    pub stage_number: StageNumber,
}

/// Result of a skip.
#[derive(Debug, Clone)]
pub struct SkipOptionalStageResult {
    pub request: ApprovalRequest,
    pub outcome: StageOutcome,
}

/// Handler for skipping optional stages.
pub struct SkipOptionalStageHandler {
    requests: Arc<dyn ApprovalRequestRepository>,
    definitions: Arc<dyn WorkflowDefinitionRepository>,
    directory: Arc<dyn ApproverDirectory>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl SkipOptionalStageHandler {
    pub fn new(
        requests: Arc<dyn ApprovalRequestRepository>,
        definitions: Arc<dyn WorkflowDefinitionRepository>,
        directory: Arc<dyn ApproverDirectory>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            requests,
            definitions,
            directory,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: SkipOptionalStageCommand,
        metadata: CommandMetadata,
    ) -> Result<SkipOptionalStageResult, WorkflowError> {
        with_conflict_retry(MAX_CONFLICT_ATTEMPTS, || self.try_handle(&cmd, &metadata)).await
    }

    async fn try_handle(
        &self,
        cmd: &SkipOptionalStageCommand,
        metadata: &CommandMetadata,
    ) -> Result<SkipOptionalStageResult, WorkflowError> {
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

        let mut updated = request.clone();
        let expected_revision = updated.revision();
        let outcome = updated.skip_stage(cmd.stage_number, &definition)?;

        self.requests.update(&updated, expected_revision).await?;

        tracing::info!(
            request_id = %cmd.request_id,
            stage = %cmd.stage_number,
            "optional stage skipped"
        );

        let event = ApprovalStageSkipped {
            event_id: EventId::new(),
            request_id: *updated.id(),
            content_id: *updated.content_id(),
            skipped_stage: cmd.stage_number,
            occurred_at: Timestamp::now(),
        };
        self.publish_quietly(
            event
                .to_envelope()
                .with_correlation_id(metadata.correlation_id())
                .with_user_id(metadata.user_id.to_string()),
        )
        .await;

        match outcome {
            StageOutcome::Advanced(next_stage) => {
                self.notify_stage(&updated, &definition, next_stage, metadata)
                    .await;
            }
            StageOutcome::Completed => {
                // Skipping the final (optional) stage completes the request
                let granted = ApprovalGranted {
                    event_id: EventId::new(),
                    request_id: *updated.id(),
                    content_id: *updated.content_id(),
                    version_number: updated.version_number(),
                    approver_id: metadata.user_id.clone(),
                    occurred_at: Timestamp::now(),
                };
                self.publish_quietly(
                    granted
                        .to_envelope()
                        .with_correlation_id(metadata.correlation_id()),
                )
                .await;

                let notification = ApproverNotification::new(
                    *updated.id(),
                    updated.current_stage(),
                    updated.submitted_by().clone(),
                    NotificationKind::Approved,
                    None,
                );
                self.publish_quietly(
                    notification
                        .to_envelope()
                        .with_correlation_id(metadata.correlation_id()),
                )
                .await;
            }
        }

        Ok(SkipOptionalStageResult {
            request: updated,
            outcome,
        })
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
            self.publish_quietly(
                notification
                    .to_envelope()
                    .with_correlation_id(metadata.correlation_id()),
            )
            .await;
        }
    }

    async fn publish_quietly(&self, envelope: EventEnvelope) {
        if let Err(err) = self.event_publisher.publish(envelope).await {
            tracing::warn!(error = %err, "event publish failed after committed transition");
        }
    }
}
