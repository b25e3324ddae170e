//! DiffVersionsHandler - line diff between two versions of a content item.

use std::sync::Arc;

use crate::domain::foundation::ContentId;
use crate::domain::version::{diff_bodies, VersionDiff, VersionError, VersionNumber};
use crate::ports::VersionRepository;

/// Query for the diff between two versions.
#[derive(Debug, Clone)]
pub struct DiffVersionsQuery {
    pub content_id: ContentId,
    pub from: VersionNumber,
    pub to: VersionNumber,
}

/// Handler computing line diffs.
pub struct DiffVersionsHandler {
    versions: Arc<dyn VersionRepository>,
}

impl DiffVersionsHandler {
    pub fn new(versions: Arc<dyn VersionRepository>) -> Self {
        Self { versions }
    }

    pub async fn handle(&self, query: DiffVersionsQuery) -> Result<VersionDiff, VersionError> {
        let from = self
            .versions
            .find(&query.content_id, query.from)
            .await?
            .ok_or_else(|| VersionError::version_not_found(query.content_id, query.from))?;
        let to = self
            .versions
            .find(&query.content_id, query.to)
            .await?
            .ok_or_else(|| VersionError::version_not_found(query.content_id, query.to))?;

        Ok(VersionDiff {
            from: query.from,
            to: query.to,
            lines: diff_bodies(from.body(), to.body()),
        })
    }
}
