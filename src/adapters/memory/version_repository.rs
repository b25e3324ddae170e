//! In-memory version store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{ContentId, DomainError, ErrorCode, Timestamp};
use crate::domain::version::{ContentVersion, VersionNumber};
use crate::ports::VersionRepository;

/// In-memory append-only version store.
///
/// The contiguity check and the insert happen under one write lock, so the
/// adapter shows the same conflict behavior as the Postgres unique index.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned.
pub struct InMemoryVersionRepository {
    versions: RwLock<HashMap<ContentId, Vec<ContentVersion>>>,
}

impl InMemoryVersionRepository {
    pub fn new() -> Self {
        Self {
            versions: RwLock::new(HashMap::new()),
        }
    }

    /// Total versions stored across all content (for test assertions).
    pub fn total_count(&self) -> usize {
        self.versions
            .read()
            .expect("InMemoryVersionRepository: lock poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }
}

impl Default for InMemoryVersionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VersionRepository for InMemoryVersionRepository {
    async fn append(&self, version: &ContentVersion) -> Result<(), DomainError> {
        let mut store = self
            .versions
            .write()
            .expect("InMemoryVersionRepository: write lock poisoned");
        let history = store.entry(*version.content_id()).or_default();

        let expected = history
            .last()
            .map(|v| v.version_number().next())
            .unwrap_or_else(VersionNumber::first);
        if version.version_number() != expected {
            return Err(DomainError::new(
                ErrorCode::ConcurrentVersionConflict,
                format!(
                    "Expected next version {} for content {}, got {}",
                    expected,
                    version.content_id(),
                    version.version_number()
                ),
            ));
        }

        history.push(version.clone());
        Ok(())
    }

    async fn find(
        &self,
        content_id: &ContentId,
        number: VersionNumber,
    ) -> Result<Option<ContentVersion>, DomainError> {
        let store = self
            .versions
            .read()
            .expect("InMemoryVersionRepository: lock poisoned");
        Ok(store.get(content_id).and_then(|history| {
            history
                .iter()
                .find(|v| v.version_number() == number)
                .cloned()
        }))
    }

    async fn list_for_content(
        &self,
        content_id: &ContentId,
    ) -> Result<Vec<ContentVersion>, DomainError> {
        let store = self
            .versions
            .read()
            .expect("InMemoryVersionRepository: lock poisoned");
        Ok(store.get(content_id).cloned().unwrap_or_default())
    }

    async fn latest_number(
        &self,
        content_id: &ContentId,
    ) -> Result<Option<VersionNumber>, DomainError> {
        let store = self
            .versions
            .read()
            .expect("InMemoryVersionRepository: lock poisoned");
        Ok(store
            .get(content_id)
            .and_then(|history| history.last().map(|v| v.version_number())))
    }

    async fn prune_before(
        &self,
        content_id: &ContentId,
        cutoff: Timestamp,
    ) -> Result<u64, DomainError> {
        let mut store = self
            .versions
            .write()
            .expect("InMemoryVersionRepository: write lock poisoned");
        let Some(history) = store.get_mut(content_id) else {
            return Ok(0);
        };

        let latest = history.last().map(|v| v.version_number());
        let before = history.len();
        history.retain(|v| {
            Some(v.version_number()) == latest || !v.created_at().is_before(&cutoff)
        });
        Ok((before - history.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    fn author() -> UserId {
        UserId::new("author-1").unwrap()
    }

    fn version(content_id: ContentId, n: u32, body: &str) -> ContentVersion {
        ContentVersion::new(
            content_id,
            VersionNumber::new(n).unwrap(),
            body.to_string(),
            author(),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn append_assigns_contiguous_slots() {
        let repo = InMemoryVersionRepository::new();
        let content_id = ContentId::new();

        repo.append(&version(content_id, 1, "a")).await.unwrap();
        repo.append(&version(content_id, 2, "b")).await.unwrap();

        assert_eq!(
            repo.latest_number(&content_id).await.unwrap(),
            Some(VersionNumber::new(2).unwrap())
        );
    }

    #[tokio::test]
    async fn append_rejects_out_of_sequence_number() {
        let repo = InMemoryVersionRepository::new();
        let content_id = ContentId::new();

        repo.append(&version(content_id, 1, "a")).await.unwrap();
        let err = repo.append(&version(content_id, 3, "c")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ConcurrentVersionConflict);
    }

    #[tokio::test]
    async fn append_rejects_duplicate_slot() {
        let repo = InMemoryVersionRepository::new();
        let content_id = ContentId::new();

        repo.append(&version(content_id, 1, "a")).await.unwrap();
        let err = repo.append(&version(content_id, 1, "again")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ConcurrentVersionConflict);
    }

    #[tokio::test]
    async fn list_is_oldest_first() {
        let repo = InMemoryVersionRepository::new();
        let content_id = ContentId::new();

        repo.append(&version(content_id, 1, "a")).await.unwrap();
        repo.append(&version(content_id, 2, "b")).await.unwrap();

        let listed = repo.list_for_content(&content_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].version_number().get(), 1);
        assert_eq!(listed[1].version_number().get(), 2);
    }

    #[tokio::test]
    async fn missing_content_has_no_latest() {
        let repo = InMemoryVersionRepository::new();
        assert_eq!(repo.latest_number(&ContentId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn prune_never_removes_latest_version() {
        let repo = InMemoryVersionRepository::new();
        let content_id = ContentId::new();

        repo.append(&version(content_id, 1, "a")).await.unwrap();

        // Cutoff in the future: everything is old enough to prune,
        // but the latest version must survive
        let cutoff = Timestamp::now().add_days(1);
        let removed = repo.prune_before(&content_id, cutoff).await.unwrap();

        assert_eq!(removed, 0);
        assert_eq!(
            repo.latest_number(&content_id).await.unwrap(),
            Some(VersionNumber::first())
        );
    }

    #[tokio::test]
    async fn prune_removes_old_versions() {
        let repo = InMemoryVersionRepository::new();
        let content_id = ContentId::new();

        repo.append(&version(content_id, 1, "a")).await.unwrap();
        repo.append(&version(content_id, 2, "b")).await.unwrap();
        repo.append(&version(content_id, 3, "c")).await.unwrap();

        let cutoff = Timestamp::now().add_days(1);
        let removed = repo.prune_before(&content_id, cutoff).await.unwrap();

        assert_eq!(removed, 2);
        let remaining = repo.list_for_content(&content_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].version_number().get(), 3);
    }
}
