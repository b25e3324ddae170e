//! In-memory content catalog gateway for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;

use crate::domain::foundation::{ContentId, DomainError};
use crate::ports::ContentGateway;

/// In-memory content catalog.
///
/// Tests register known content with `register`; anything else does not
/// exist as far as the engine is concerned.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned.
pub struct InMemoryContentGateway {
    known: RwLock<HashSet<ContentId>>,
}

impl InMemoryContentGateway {
    pub fn new() -> Self {
        Self {
            known: RwLock::new(HashSet::new()),
        }
    }

    /// Marks a content item as existing in the catalog.
    pub fn register(&self, content_id: ContentId) {
        self.known
            .write()
            .expect("InMemoryContentGateway: write lock poisoned")
            .insert(content_id);
    }
}

impl Default for InMemoryContentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGateway for InMemoryContentGateway {
    async fn content_exists(&self, content_id: &ContentId) -> Result<bool, DomainError> {
        let known = self
            .known
            .read()
            .expect("InMemoryContentGateway: lock poisoned");
        Ok(known.contains(content_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_content_exists() {
        let gateway = InMemoryContentGateway::new();
        let content_id = ContentId::new();

        gateway.register(content_id);

        assert!(gateway.content_exists(&content_id).await.unwrap());
        assert!(!gateway.content_exists(&ContentId::new()).await.unwrap());
    }
}
