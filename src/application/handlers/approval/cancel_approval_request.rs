//! CancelApprovalRequestHandler - withdraws a pending request.

use std::sync::Arc;

use crate::application::retry::{with_conflict_retry, MAX_CONFLICT_ATTEMPTS};
use crate::domain::foundation::{
    CommandMetadata, EventEnvelope, EventId, RequestId, SerializableDomainEvent, Timestamp,
};
use crate::domain::workflow::{
    stage_recipients, ApprovalCancelled, ApprovalRequest, ApproverNotification, NotificationKind,
    WorkflowError,
};
use crate::ports::{
    ApprovalRequestRepository, ApproverDirectory, EventPublisher, WorkflowDefinitionRepository,
};

/// Command to cancel a pending approval request.
#[derive(Debug, Clone)]
pub struct CancelApprovalRequestCommand {
    pub request_id: RequestId,
    /// Asserted by the caller's authorization layer; role management is
    /// outside this core.
    pub has_cancellation_rights: bool,
}

/// Result of a cancellation.
#[derive(Debug, Clone)]
pub struct CancelApprovalRequestResult {
    pub request: ApprovalRequest,
}

/// Handler for cancelling approval requests.
pub struct CancelApprovalRequestHandler {
    requests: Arc<dyn ApprovalRequestRepository>,
    definitions: Arc<dyn WorkflowDefinitionRepository>,
    directory: Arc<dyn ApproverDirectory>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CancelApprovalRequestHandler {
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
        cmd: CancelApprovalRequestCommand,
        metadata: CommandMetadata,
    ) -> Result<CancelApprovalRequestResult, WorkflowError> {
        with_conflict_retry(MAX_CONFLICT_ATTEMPTS, || self.try_handle(&cmd, &metadata)).await
    }

    async fn try_handle(
        &self,
        cmd: &CancelApprovalRequestCommand,
        metadata: &CommandMetadata,
    ) -> Result<CancelApprovalRequestResult, WorkflowError> {
        let request = self
            .requests
            .find_by_id(&cmd.request_id)
            .await?
            .ok_or(WorkflowError::RequestNotFound(cmd.request_id))?;

        let mut updated = request.clone();
        let expected_revision = updated.revision();
        let pending_stage = updated.current_stage();
        updated.cancel(&metadata.user_id, cmd.has_cancellation_rights)?;

        self.requests.update(&updated, expected_revision).await?;

        tracing::info!(
            request_id = %cmd.request_id,
            cancelled_by = %metadata.user_id,
            "approval request cancelled"
        );

        let event = ApprovalCancelled {
            event_id: EventId::new(),
            request_id: *updated.id(),
            content_id: *updated.content_id(),
            cancelled_by: metadata.user_id.clone(),
            occurred_at: Timestamp::now(),
        };
        self.publish_quietly(
            event
                .to_envelope()
                .with_correlation_id(metadata.correlation_id())
                .with_user_id(metadata.user_id.to_string()),
        )
        .await;

        // Approvers of the stage that was pending learn the request is gone
        if let Ok(Some(definition)) = self.definitions.find_by_id(updated.workflow_id()).await {
            if let Some(stage) = definition.stage(pending_stage) {
                let role_holders = self
                    .directory
                    .users_with_role(stage.approver_role())
                    .await
                    .unwrap_or_default();
                for recipient in stage_recipients(stage, role_holders) {
                    let notification = ApproverNotification::new(
                        *updated.id(),
                        pending_stage,
                        recipient,
                        NotificationKind::Cancelled,
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
        }

        Ok(CancelApprovalRequestResult { request: updated })
    }

    async fn publish_quietly(&self, envelope: EventEnvelope) {
        if let Err(err) = self.event_publisher.publish(envelope).await {
            tracing::warn!(error = %err, "event publish failed after committed transition");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{
        InMemoryApprovalRequestRepository, InMemoryApproverDirectory,
        InMemoryWorkflowDefinitionRepository,
    };
    use crate::domain::foundation::{ApproverRole, CampaignId, ContentId, UserId, WorkflowId};
    use crate::domain::version::VersionNumber;
    use crate::domain::workflow::{
        ApprovalStage, ApprovalStatus, ApprovalWorkflowDefinition, StageNumber,
    };

    struct Fixture {
        requests: Arc<InMemoryApprovalRequestRepository>,
        bus: Arc<InMemoryEventBus>,
        handler: CancelApprovalRequestHandler,
        request_id: RequestId,
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    async fn fixture() -> Fixture {
        let requests = Arc::new(InMemoryApprovalRequestRepository::new());
        let definitions = Arc::new(InMemoryWorkflowDefinitionRepository::new());
        let directory = Arc::new(InMemoryApproverDirectory::new());
        let bus = Arc::new(InMemoryEventBus::new());

        let definition = ApprovalWorkflowDefinition::new(
            WorkflowId::new(),
            CampaignId::new(),
            vec![ApprovalStage::new(
                StageNumber::first(),
                ApproverRole::new("editor").unwrap(),
                None,
                true,
            )],
        )
        .unwrap();
        definitions.save(&definition).await.unwrap();
        directory.assign(user("editor-1"), ApproverRole::new("editor").unwrap());

        let request = ApprovalRequest::new(
            RequestId::new(),
            ContentId::new(),
            *definition.id(),
            VersionNumber::first(),
            user("submitter-1"),
        );
        requests.insert_active(&request).await.unwrap();

        let handler = CancelApprovalRequestHandler::new(
            requests.clone(),
            definitions,
            directory,
            bus.clone(),
        );

        Fixture {
            requests,
            bus,
            handler,
            request_id: *request.id(),
        }
    }

    #[tokio::test]
    async fn submitter_cancels_own_request() {
        let fix = fixture().await;
        let cmd = CancelApprovalRequestCommand {
            request_id: fix.request_id,
            has_cancellation_rights: false,
        };

        let result = fix
            .handler
            .handle(cmd, CommandMetadata::new(user("submitter-1")))
            .await
            .unwrap();

        assert_eq!(result.request.status(), ApprovalStatus::Cancelled);
        assert_eq!(fix.bus.events_of_type("approval.cancelled.v1").len(), 1);
    }

    #[tokio::test]
    async fn pending_stage_approvers_are_notified() {
        let fix = fixture().await;
        let cmd = CancelApprovalRequestCommand {
            request_id: fix.request_id,
            has_cancellation_rights: false,
        };

        fix.handler
            .handle(cmd, CommandMetadata::new(user("submitter-1")))
            .await
            .unwrap();

        let notifications = fix.bus.events_of_type("approval.notify.v1");
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].payload["recipient"], "editor-1");
        assert_eq!(notifications[0].payload["kind"], "cancelled");
    }

    #[tokio::test]
    async fn stranger_without_rights_is_forbidden() {
        let fix = fixture().await;
        let cmd = CancelApprovalRequestCommand {
            request_id: fix.request_id,
            has_cancellation_rights: false,
        };

        let err = fix
            .handler
            .handle(cmd, CommandMetadata::new(user("someone-else")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let request = fix.requests.find_by_id(&fix.request_id).await.unwrap().unwrap();
        assert_eq!(request.status(), ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn granted_rights_allow_cancellation() {
        let fix = fixture().await;
        let cmd = CancelApprovalRequestCommand {
            request_id: fix.request_id,
            has_cancellation_rights: true,
        };

        let result = fix
            .handler
            .handle(cmd, CommandMetadata::new(user("campaign-admin")))
            .await
            .unwrap();
        assert_eq!(result.request.status(), ApprovalStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancelling_settled_request_fails() {
        let fix = fixture().await;
        let cmd = CancelApprovalRequestCommand {
            request_id: fix.request_id,
            has_cancellation_rights: false,
        };
        let meta = CommandMetadata::new(user("submitter-1"));

        fix.handler.handle(cmd.clone(), meta.clone()).await.unwrap();
        let err = fix.handler.handle(cmd, meta).await.unwrap_err();

        assert!(matches!(err, WorkflowError::RequestTerminal(_)));
    }
}
