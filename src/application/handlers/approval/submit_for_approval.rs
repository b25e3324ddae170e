//! SubmitForApprovalHandler - enters a content version into its campaign's
//! approval chain.

use std::sync::Arc;

use crate::domain::foundation::{
    CommandMetadata, ContentId, ErrorCode, EventEnvelope, EventId, RequestId,
    SerializableDomainEvent, Timestamp, WorkflowId,
};
use crate::domain::version::VersionNumber;
use crate::domain::workflow::{
    stage_recipients, ApprovalRequest, ApprovalSubmitted, ApprovalWorkflowDefinition,
    ApproverNotification, NotificationKind, StageNumber, WorkflowError,
};
use crate::ports::{
    ApprovalRequestRepository, ApproverDirectory, ContentGateway, EventPublisher,
    VersionRepository, WorkflowDefinitionRepository,
};

/// Command to submit a content version for approval.
#[derive(Debug, Clone)]
pub struct SubmitForApprovalCommand {
    pub content_id: ContentId,
    pub workflow_id: WorkflowId,
    /// The exact version under review; later edits never move this pin.
    pub version_number: VersionNumber,
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitForApprovalResult {
    pub request: ApprovalRequest,
}

/// Handler for submitting content versions into approval.
pub struct SubmitForApprovalHandler {
    requests: Arc<dyn ApprovalRequestRepository>,
    definitions: Arc<dyn WorkflowDefinitionRepository>,
    versions: Arc<dyn VersionRepository>,
    content: Arc<dyn ContentGateway>,
    directory: Arc<dyn ApproverDirectory>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl SubmitForApprovalHandler {
    pub fn new(
        requests: Arc<dyn ApprovalRequestRepository>,
        definitions: Arc<dyn WorkflowDefinitionRepository>,
        versions: Arc<dyn VersionRepository>,
        content: Arc<dyn ContentGateway>,
        directory: Arc<dyn ApproverDirectory>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            requests,
            definitions,
            versions,
            content,
            directory,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitForApprovalCommand,
        metadata: CommandMetadata,
    ) -> Result<SubmitForApprovalResult, WorkflowError> {
        // 1. The content item and the pinned version must exist
        if !self.content.content_exists(&cmd.content_id).await? {
            return Err(WorkflowError::ContentNotFound(cmd.content_id));
        }
        if self
            .versions
            .find(&cmd.content_id, cmd.version_number)
            .await?
            .is_none()
        {
            return Err(WorkflowError::VersionNotFound(
                cmd.content_id,
                cmd.version_number,
            ));
        }

        // 2. The workflow definition must exist
        let definition = self
            .definitions
            .find_by_id(&cmd.workflow_id)
            .await?
            .ok_or(WorkflowError::WorkflowNotFound(cmd.workflow_id))?;

        // 3. Create and persist the request; the repository enforces the
        //    one-active-request-per-content invariant transactionally
        let request = ApprovalRequest::new(
            RequestId::new(),
            cmd.content_id,
            cmd.workflow_id,
            cmd.version_number,
            metadata.user_id.clone(),
        );
        self.requests.insert_active(&request).await.map_err(|err| {
            if err.code == ErrorCode::DuplicateActiveRequest {
                WorkflowError::DuplicateActiveRequest(cmd.content_id)
            } else {
                WorkflowError::from(err)
            }
        })?;

        tracing::info!(
            request_id = %request.id(),
            content_id = %cmd.content_id,
            version = %cmd.version_number,
            "approval request submitted"
        );

        // 4. Publish the transition event and stage-1 notifications.
        //    The request is committed; a lost event never rolls it back.
        let event = ApprovalSubmitted {
            event_id: EventId::new(),
            request_id: *request.id(),
            content_id: cmd.content_id,
            workflow_id: cmd.workflow_id,
            version_number: cmd.version_number,
            submitted_by: metadata.user_id.clone(),
            occurred_at: Timestamp::now(),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        self.publish_quietly(envelope).await;

        self.notify_stage(&request, &definition, StageNumber::first(), &metadata)
            .await;

        Ok(SubmitForApprovalResult { request })
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
            let envelope = notification
                .to_envelope()
                .with_correlation_id(metadata.correlation_id());
            self.publish_quietly(envelope).await;
        }
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
        InMemoryApprovalRequestRepository, InMemoryApproverDirectory, InMemoryContentGateway,
        InMemoryVersionRepository, InMemoryWorkflowDefinitionRepository,
    };
    use crate::domain::foundation::{ApproverRole, CampaignId, UserId, WorkflowId};
    use crate::domain::version::ContentVersion;
    use crate::domain::workflow::{ApprovalStage, ApprovalStatus, ApprovalWorkflowDefinition};

    struct Fixture {
        requests: Arc<InMemoryApprovalRequestRepository>,
        definitions: Arc<InMemoryWorkflowDefinitionRepository>,
        versions: Arc<InMemoryVersionRepository>,
        content: Arc<InMemoryContentGateway>,
        directory: Arc<InMemoryApproverDirectory>,
        bus: Arc<InMemoryEventBus>,
        handler: SubmitForApprovalHandler,
    }

    fn fixture() -> Fixture {
        let requests = Arc::new(InMemoryApprovalRequestRepository::new());
        let definitions = Arc::new(InMemoryWorkflowDefinitionRepository::new());
        let versions = Arc::new(InMemoryVersionRepository::new());
        let content = Arc::new(InMemoryContentGateway::new());
        let directory = Arc::new(InMemoryApproverDirectory::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = SubmitForApprovalHandler::new(
            requests.clone(),
            definitions.clone(),
            versions.clone(),
            content.clone(),
            directory.clone(),
            bus.clone(),
        );
        Fixture {
            requests,
            definitions,
            versions,
            content,
            directory,
            bus,
            handler,
        }
    }

    fn creator() -> UserId {
        UserId::new("creator-1").unwrap()
    }

    fn metadata() -> CommandMetadata {
        CommandMetadata::new(creator()).with_correlation_id("test-correlation")
    }

    async fn seed(fix: &Fixture) -> SubmitForApprovalCommand {
        let content_id = ContentId::new();
        fix.content.register(content_id);

        let version = ContentVersion::new(
            content_id,
            VersionNumber::first(),
            "draft body".to_string(),
            creator(),
            None,
        )
        .unwrap();
        fix.versions.append(&version).await.unwrap();

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
        fix.definitions.save(&definition).await.unwrap();

        SubmitForApprovalCommand {
            content_id,
            workflow_id: *definition.id(),
            version_number: VersionNumber::first(),
        }
    }

    #[tokio::test]
    async fn submit_creates_pending_request_at_stage_one() {
        let fix = fixture();
        let cmd = seed(&fix).await;

        let result = fix.handler.handle(cmd.clone(), metadata()).await.unwrap();

        assert_eq!(result.request.status(), ApprovalStatus::Pending);
        assert_eq!(result.request.current_stage(), StageNumber::first());
        assert_eq!(result.request.version_number(), cmd.version_number);
        assert!(fix
            .requests
            .find_active_by_content(&cmd.content_id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn submit_publishes_submitted_event_with_correlation() {
        let fix = fixture();
        let cmd = seed(&fix).await;

        fix.handler.handle(cmd, metadata()).await.unwrap();

        let events = fix.bus.events_of_type("approval.submitted.v1");
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].metadata.correlation_id,
            Some("test-correlation".to_string())
        );
    }

    #[tokio::test]
    async fn submit_notifies_every_stage_one_role_holder() {
        let fix = fixture();
        let cmd = seed(&fix).await;
        let editor = ApproverRole::new("editor").unwrap();
        fix.directory
            .assign(UserId::new("editor-1").unwrap(), editor.clone());
        fix.directory
            .assign(UserId::new("editor-2").unwrap(), editor);

        fix.handler.handle(cmd, metadata()).await.unwrap();

        let notifications = fix.bus.events_of_type("approval.notify.v1");
        assert_eq!(notifications.len(), 2);
    }

    #[tokio::test]
    async fn second_submit_for_same_content_is_rejected() {
        let fix = fixture();
        let cmd = seed(&fix).await;

        fix.handler.handle(cmd.clone(), metadata()).await.unwrap();
        let err = fix.handler.handle(cmd.clone(), metadata()).await.unwrap_err();

        assert!(matches!(err, WorkflowError::DuplicateActiveRequest(id) if id == cmd.content_id));
    }

    #[tokio::test]
    async fn submit_fails_for_unknown_workflow() {
        let fix = fixture();
        let mut cmd = seed(&fix).await;
        cmd.workflow_id = WorkflowId::new();

        let err = fix.handler.handle(cmd, metadata()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::WorkflowNotFound(_)));
    }

    #[tokio::test]
    async fn submit_fails_for_missing_version() {
        let fix = fixture();
        let mut cmd = seed(&fix).await;
        cmd.version_number = VersionNumber::new(9).unwrap();

        let err = fix.handler.handle(cmd, metadata()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::VersionNotFound(_, _)));
    }

    #[tokio::test]
    async fn submit_fails_for_unknown_content() {
        let fix = fixture();
        let mut cmd = seed(&fix).await;
        cmd.content_id = ContentId::new();

        let err = fix.handler.handle(cmd, metadata()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::ContentNotFound(_)));
    }
}
