//! Version repository port - the append-only content version store.
//!
//! # Design
//!
//! - **Append-only**: existing versions are never mutated; pruning by
//!   retention policy is the single sanctioned deletion path
//! - **Contiguity at the boundary**: `append` assigns and enforces the next
//!   version number atomically, so concurrent appends serialize instead of
//!   colliding or leaving gaps

use async_trait::async_trait;

use crate::domain::foundation::{ContentId, DomainError, Timestamp};
use crate::domain::version::{ContentVersion, VersionNumber};

/// Repository port for the content version history.
#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// Persist a new version.
    ///
    /// The version's number must be exactly `latest + 1` (or 1 for new
    /// content) at commit time. Implementations check-and-insert atomically.
    ///
    /// # Errors
    ///
    /// - `ConcurrentVersionConflict` if another append won the slot
    /// - `DatabaseError` on persistence failure
    async fn append(&self, version: &ContentVersion) -> Result<(), DomainError>;

    /// Find a specific version of a content item.
    ///
    /// Returns `None` if not found.
    async fn find(
        &self,
        content_id: &ContentId,
        number: VersionNumber,
    ) -> Result<Option<ContentVersion>, DomainError>;

    /// List all versions of a content item, oldest first.
    async fn list_for_content(
        &self,
        content_id: &ContentId,
    ) -> Result<Vec<ContentVersion>, DomainError>;

    /// The highest version number for a content item, if any exist.
    async fn latest_number(
        &self,
        content_id: &ContentId,
    ) -> Result<Option<VersionNumber>, DomainError>;

    /// Delete versions of a content item created strictly before `cutoff`.
    ///
    /// Returns the number of versions removed. The latest version is never
    /// deleted regardless of age.
    async fn prune_before(
        &self,
        content_id: &ContentId,
        cutoff: Timestamp,
    ) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn VersionRepository) {}
    }
}
