//! GetApprovalStatusHandler - read side of the approval engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ContentId;
use crate::domain::version::VersionNumber;
use crate::domain::workflow::{ApprovalAction, ApprovalRequest, WorkflowError};
use crate::ports::{
    ApprovalActionRepository, ApprovalRequestRepository, VersionRepository,
    WorkflowDefinitionRepository,
};

/// Query for the approval status of a content item.
#[derive(Debug, Clone)]
pub struct GetApprovalStatusQuery {
    pub content_id: ContentId,
}

/// Status view: the active (or most recent) request with derived context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalStatusView {
    pub request: ApprovalRequest,
    pub total_stages: u32,
    /// The content's newest version, if any survive.
    pub latest_version: Option<VersionNumber>,
    /// True when the content has moved past the version under review.
    /// Approvers see this and can knowingly act on outdated content.
    pub is_stale: bool,
    /// Full audit trail for the request, oldest first.
    pub actions: Vec<ApprovalAction>,
}

/// Handler answering status queries.
pub struct GetApprovalStatusHandler {
    requests: Arc<dyn ApprovalRequestRepository>,
    definitions: Arc<dyn WorkflowDefinitionRepository>,
    versions: Arc<dyn VersionRepository>,
    actions: Arc<dyn ApprovalActionRepository>,
}

impl GetApprovalStatusHandler {
    pub fn new(
        requests: Arc<dyn ApprovalRequestRepository>,
        definitions: Arc<dyn WorkflowDefinitionRepository>,
        versions: Arc<dyn VersionRepository>,
        actions: Arc<dyn ApprovalActionRepository>,
    ) -> Self {
        Self {
            requests,
            definitions,
            versions,
            actions,
        }
    }

    /// Returns the view for the active request, falling back to the most
    /// recently submitted one; `None` when the content was never submitted.
    pub async fn handle(
        &self,
        query: GetApprovalStatusQuery,
    ) -> Result<Option<ApprovalStatusView>, WorkflowError> {
        let request = match self
            .requests
            .find_active_by_content(&query.content_id)
            .await?
        {
            Some(active) => active,
            None => match self
                .requests
                .find_latest_by_content(&query.content_id)
                .await?
            {
                Some(latest) => latest,
                None => return Ok(None),
            },
        };

        let definition = self
            .definitions
            .find_by_id(request.workflow_id())
            .await?
            .ok_or(WorkflowError::WorkflowNotFound(*request.workflow_id()))?;
        let latest_version = self.versions.latest_number(&query.content_id).await?;
        let actions = self.actions.list_for_request(request.id()).await?;

        let is_stale = request.is_stale(latest_version);
        Ok(Some(ApprovalStatusView {
            total_stages: definition.total_stages(),
            latest_version,
            is_stale,
            actions,
            request,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryApprovalActionRepository, InMemoryApprovalRequestRepository,
        InMemoryVersionRepository, InMemoryWorkflowDefinitionRepository,
    };
    use crate::domain::foundation::{ApproverRole, CampaignId, RequestId, UserId, WorkflowId};
    use crate::domain::version::ContentVersion;
    use crate::domain::workflow::{ApprovalStage, ApprovalWorkflowDefinition, StageNumber};

    struct Fixture {
        requests: Arc<InMemoryApprovalRequestRepository>,
        versions: Arc<InMemoryVersionRepository>,
        handler: GetApprovalStatusHandler,
        workflow_id: WorkflowId,
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    async fn fixture() -> Fixture {
        let requests = Arc::new(InMemoryApprovalRequestRepository::new());
        let definitions = Arc::new(InMemoryWorkflowDefinitionRepository::new());
        let versions = Arc::new(InMemoryVersionRepository::new());
        let actions = Arc::new(InMemoryApprovalActionRepository::new());

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

        let handler = GetApprovalStatusHandler::new(
            requests.clone(),
            definitions,
            versions.clone(),
            actions,
        );

        Fixture {
            requests,
            versions,
            handler,
            workflow_id: *definition.id(),
        }
    }

    async fn seed_version(fix: &Fixture, content_id: ContentId, n: u32) {
        let version = ContentVersion::new(
            content_id,
            VersionNumber::new(n).unwrap(),
            format!("body v{}", n),
            user("author-1"),
            None,
        )
        .unwrap();
        fix.versions.append(&version).await.unwrap();
    }

    #[tokio::test]
    async fn never_submitted_content_has_no_view() {
        let fix = fixture().await;
        let view = fix
            .handler
            .handle(GetApprovalStatusQuery {
                content_id: ContentId::new(),
            })
            .await
            .unwrap();
        assert!(view.is_none());
    }

    #[tokio::test]
    async fn fresh_request_is_not_stale() {
        let fix = fixture().await;
        let content_id = ContentId::new();
        seed_version(&fix, content_id, 1).await;

        let request = ApprovalRequest::new(
            RequestId::new(),
            content_id,
            fix.workflow_id,
            VersionNumber::first(),
            user("submitter-1"),
        );
        fix.requests.insert_active(&request).await.unwrap();

        let view = fix
            .handler
            .handle(GetApprovalStatusQuery { content_id })
            .await
            .unwrap()
            .unwrap();

        assert!(!view.is_stale);
        assert_eq!(view.total_stages, 1);
        assert_eq!(view.latest_version, Some(VersionNumber::first()));
    }

    #[tokio::test]
    async fn newer_version_marks_request_stale() {
        let fix = fixture().await;
        let content_id = ContentId::new();
        seed_version(&fix, content_id, 1).await;

        let request = ApprovalRequest::new(
            RequestId::new(),
            content_id,
            fix.workflow_id,
            VersionNumber::first(),
            user("submitter-1"),
        );
        fix.requests.insert_active(&request).await.unwrap();

        // Author keeps editing while review is in flight
        seed_version(&fix, content_id, 2).await;

        let view = fix
            .handler
            .handle(GetApprovalStatusQuery { content_id })
            .await
            .unwrap()
            .unwrap();
        assert!(view.is_stale);
    }

    #[tokio::test]
    async fn settled_request_is_still_visible() {
        let fix = fixture().await;
        let content_id = ContentId::new();
        seed_version(&fix, content_id, 1).await;

        let mut request = ApprovalRequest::new(
            RequestId::new(),
            content_id,
            fix.workflow_id,
            VersionNumber::first(),
            user("submitter-1"),
        );
        fix.requests.insert_active(&request).await.unwrap();
        request.reject(StageNumber::first()).unwrap();
        fix.requests.update(&request, 0).await.unwrap();

        let view = fix
            .handler
            .handle(GetApprovalStatusQuery { content_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.request.id(), request.id());
    }
}
