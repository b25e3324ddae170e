//! RevertToVersionHandler - restores an earlier body as a brand-new version.
//!
//! History is never rewritten: reverting to v2 at v5 produces a v6 whose
//! body equals v2's, with a generated change summary naming the source.

use std::sync::Arc;

use crate::application::retry::{with_conflict_retry, MAX_CONFLICT_ATTEMPTS};
use crate::domain::foundation::{
    CommandMetadata, ContentId, ErrorCode, EventId, SerializableDomainEvent,
};
use crate::domain::version::{ContentVersion, VersionAppended, VersionError, VersionNumber};
use crate::ports::{EventPublisher, VersionRepository};

/// Command to revert a content item to an earlier version.
#[derive(Debug, Clone)]
pub struct RevertToVersionCommand {
    pub content_id: ContentId,
    pub target: VersionNumber,
}

/// Result of a revert.
#[derive(Debug, Clone)]
pub struct RevertToVersionResult {
    pub version: ContentVersion,
}

/// Handler for reverts.
pub struct RevertToVersionHandler {
    versions: Arc<dyn VersionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RevertToVersionHandler {
    pub fn new(versions: Arc<dyn VersionRepository>, event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            versions,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RevertToVersionCommand,
        metadata: CommandMetadata,
    ) -> Result<RevertToVersionResult, VersionError> {
        let source = self
            .versions
            .find(&cmd.content_id, cmd.target)
            .await?
            .ok_or_else(|| VersionError::version_not_found(cmd.content_id, cmd.target))?;

        let version = with_conflict_retry(MAX_CONFLICT_ATTEMPTS, || {
            self.try_revert(&cmd, &source, &metadata)
        })
        .await?;

        tracing::info!(
            content_id = %cmd.content_id,
            source = %cmd.target,
            version = %version.version_number(),
            "content reverted to earlier version"
        );

        let event = VersionAppended {
            event_id: EventId::new(),
            content_id: *version.content_id(),
            version_number: version.version_number(),
            author_id: metadata.user_id.clone(),
            change_summary: version.change_summary().map(str::to_string),
            created_at: *version.created_at(),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        if let Err(err) = self.event_publisher.publish(envelope).await {
            tracing::warn!(error = %err, "event publish failed after committed revert");
        }

        Ok(RevertToVersionResult { version })
    }

    async fn try_revert(
        &self,
        cmd: &RevertToVersionCommand,
        source: &ContentVersion,
        metadata: &CommandMetadata,
    ) -> Result<ContentVersion, VersionError> {
        let next_number = match self.versions.latest_number(&cmd.content_id).await? {
            Some(latest) => latest.next(),
            None => VersionNumber::first(),
        };

        let version = ContentVersion::revert_from(source, next_number, metadata.user_id.clone());
        self.versions.append(&version).await.map_err(|err| {
            if err.code == ErrorCode::ConcurrentVersionConflict {
                VersionError::concurrent_conflict(cmd.content_id)
            } else {
                VersionError::from(err)
            }
        })?;

        Ok(version)
    }
}
