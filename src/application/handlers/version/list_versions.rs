//! ListVersionsHandler - version history of a content item, oldest first.

use std::sync::Arc;

use crate::domain::foundation::ContentId;
use crate::domain::version::{VersionError, VersionSummary};
use crate::ports::VersionRepository;

/// Query for a content item's version history.
#[derive(Debug, Clone)]
pub struct ListVersionsQuery {
    pub content_id: ContentId,
}

/// Handler listing version metadata. Bodies are elided; callers wanting a
/// specific body fetch that version directly.
pub struct ListVersionsHandler {
    versions: Arc<dyn VersionRepository>,
}

impl ListVersionsHandler {
    pub fn new(versions: Arc<dyn VersionRepository>) -> Self {
        Self { versions }
    }

    pub async fn handle(&self, query: ListVersionsQuery) -> Result<Vec<VersionSummary>, VersionError> {
        let history = self.versions.list_for_content(&query.content_id).await?;
        if history.is_empty() {
            return Err(VersionError::content_not_found(query.content_id));
        }
        Ok(history.iter().map(|v| v.summary()).collect())
    }
}
