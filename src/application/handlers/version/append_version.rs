//! AppendVersionHandler - records a new snapshot of a content item's body.

use std::sync::Arc;

use crate::application::retry::{with_conflict_retry, MAX_CONFLICT_ATTEMPTS};
use crate::domain::foundation::{
    CommandMetadata, ContentId, ErrorCode, EventId, SerializableDomainEvent,
};
use crate::domain::version::{ContentVersion, VersionAppended, VersionError, VersionNumber};
use crate::ports::{ContentGateway, EventPublisher, VersionRepository};

/// Command to append a new version.
#[derive(Debug, Clone)]
pub struct AppendVersionCommand {
    pub content_id: ContentId,
    pub body: String,
    pub change_summary: Option<String>,
}

/// Result of a successful append.
#[derive(Debug, Clone)]
pub struct AppendVersionResult {
    pub version: ContentVersion,
}

/// Handler for appending versions.
pub struct AppendVersionHandler {
    versions: Arc<dyn VersionRepository>,
    content: Arc<dyn ContentGateway>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl AppendVersionHandler {
    pub fn new(
        versions: Arc<dyn VersionRepository>,
        content: Arc<dyn ContentGateway>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            versions,
            content,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: AppendVersionCommand,
        metadata: CommandMetadata,
    ) -> Result<AppendVersionResult, VersionError> {
        if !self.content.content_exists(&cmd.content_id).await? {
            return Err(VersionError::content_not_found(cmd.content_id));
        }

        // Read-max-then-insert races with concurrent appends; losers re-read
        // the new maximum and take the next slot
        let version = with_conflict_retry(MAX_CONFLICT_ATTEMPTS, || self.try_append(&cmd, &metadata))
            .await?;

        tracing::info!(
            content_id = %cmd.content_id,
            version = %version.version_number(),
            "content version appended"
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
            tracing::warn!(error = %err, "event publish failed after committed append");
        }

        Ok(AppendVersionResult { version })
    }

    async fn try_append(
        &self,
        cmd: &AppendVersionCommand,
        metadata: &CommandMetadata,
    ) -> Result<ContentVersion, VersionError> {
        let next_number = match self.versions.latest_number(&cmd.content_id).await? {
            Some(latest) => latest.next(),
            None => VersionNumber::first(),
        };

        let version = ContentVersion::new(
            cmd.content_id,
            next_number,
            cmd.body.clone(),
            metadata.user_id.clone(),
            cmd.change_summary.clone(),
        )
        .map_err(|err| VersionError::validation("change_summary", err.to_string()))?;

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
