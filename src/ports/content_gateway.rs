//! Content gateway port - existence checks against the content catalog.
//!
//! Content items themselves (titles, channels, campaign membership) are
//! owned elsewhere; the version store only needs to know an item exists
//! before accepting its first version.

use async_trait::async_trait;

use crate::domain::foundation::{ContentId, DomainError};

/// Port for querying the external content catalog.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Whether the content item exists in the catalog.
    async fn content_exists(&self, content_id: &ContentId) -> Result<bool, DomainError>;
}
