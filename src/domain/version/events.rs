//! Domain events emitted by the version store.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContentId, EventId, Timestamp, UserId};
use crate::domain_event;

use super::VersionNumber;

/// A new version of a content item's body was recorded.
///
/// Emitted for plain appends and for reverts alike; a revert is just an
/// append whose summary names the source version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionAppended {
    pub event_id: EventId,
    pub content_id: ContentId,
    pub version_number: VersionNumber,
    pub author_id: UserId,
    pub change_summary: Option<String>,
    pub created_at: Timestamp,
}

domain_event!(
    VersionAppended,
    event_type = "content.version_appended.v1",
    schema_version = 1,
    aggregate_id = content_id,
    aggregate_type = "ContentVersion",
    occurred_at = created_at,
    event_id = event_id
);
