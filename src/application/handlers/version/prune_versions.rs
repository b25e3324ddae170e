//! PruneVersionsHandler - removes versions older than a retention cutoff.
//!
//! The latest version is always kept, whatever its age.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, ContentId, Timestamp};
use crate::domain::version::{RetentionPolicy, VersionError};
use crate::ports::VersionRepository;

/// Command to prune aged versions of a content item.
#[derive(Debug, Clone)]
pub struct PruneVersionsCommand {
    pub content_id: ContentId,
    pub policy: RetentionPolicy,
}

/// Result of a prune run.
#[derive(Debug, Clone)]
pub struct PruneVersionsResult {
    pub removed: u64,
}

/// Handler for retention pruning.
pub struct PruneVersionsHandler {
    versions: Arc<dyn VersionRepository>,
}

impl PruneVersionsHandler {
    pub fn new(versions: Arc<dyn VersionRepository>) -> Self {
        Self { versions }
    }

    pub async fn handle(
        &self,
        cmd: PruneVersionsCommand,
        metadata: CommandMetadata,
    ) -> Result<PruneVersionsResult, VersionError> {
        let cutoff = cmd.policy.cutoff(Timestamp::now());
        let removed = self.versions.prune_before(&cmd.content_id, cutoff).await?;

        tracing::info!(
            content_id = %cmd.content_id,
            removed,
            retain_days = cmd.policy.retain_days(),
            user_id = %metadata.user_id,
            "version history pruned"
        );

        Ok(PruneVersionsResult { removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryVersionRepository;
    use crate::domain::foundation::UserId;
    use crate::domain::version::{ContentVersion, VersionNumber};

    fn aged_version(content_id: ContentId, number: u32, age_days: i64) -> ContentVersion {
        ContentVersion::reconstitute(
            content_id,
            VersionNumber::new(number).unwrap(),
            format!("body {}", number),
            UserId::new("author-1").unwrap(),
            Timestamp::now().minus_days(age_days),
            None,
        )
    }

    fn metadata() -> CommandMetadata {
        CommandMetadata::new(UserId::new("operator-1").unwrap())
    }

    #[tokio::test]
    async fn prunes_versions_older_than_cutoff() {
        let content_id = ContentId::new();
        let repo = Arc::new(InMemoryVersionRepository::new());
        repo.append(&aged_version(content_id, 1, 200)).await.unwrap();
        repo.append(&aged_version(content_id, 2, 150)).await.unwrap();
        repo.append(&aged_version(content_id, 3, 10)).await.unwrap();

        let handler = PruneVersionsHandler::new(repo.clone());
        let result = handler
            .handle(
                PruneVersionsCommand {
                    content_id,
                    policy: RetentionPolicy::new(90).unwrap(),
                },
                metadata(),
            )
            .await
            .unwrap();

        assert_eq!(result.removed, 2);
        let remaining = repo.list_for_content(&content_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].version_number().get(), 3);
    }

    #[tokio::test]
    async fn latest_version_survives_even_when_aged() {
        let content_id = ContentId::new();
        let repo = Arc::new(InMemoryVersionRepository::new());
        repo.append(&aged_version(content_id, 1, 400)).await.unwrap();
        repo.append(&aged_version(content_id, 2, 300)).await.unwrap();

        let handler = PruneVersionsHandler::new(repo.clone());
        let result = handler
            .handle(
                PruneVersionsCommand {
                    content_id,
                    policy: RetentionPolicy::new(90).unwrap(),
                },
                metadata(),
            )
            .await
            .unwrap();

        assert_eq!(result.removed, 1);
        let remaining = repo.list_for_content(&content_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].version_number().get(), 2);
    }

    #[tokio::test]
    async fn nothing_to_prune_reports_zero() {
        let content_id = ContentId::new();
        let repo = Arc::new(InMemoryVersionRepository::new());
        repo.append(&aged_version(content_id, 1, 5)).await.unwrap();

        let handler = PruneVersionsHandler::new(repo);
        let result = handler
            .handle(
                PruneVersionsCommand {
                    content_id,
                    policy: RetentionPolicy::new(90).unwrap(),
                },
                metadata(),
            )
            .await
            .unwrap();

        assert_eq!(result.removed, 0);
    }
}
