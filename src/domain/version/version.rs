//! ContentVersion entity and version numbering.
//!
//! A content item owns an ordered sequence of versions; insertion order equals
//! version_number order.
//!
//! # Invariants
//!
//! - `version_number` is strictly increasing and contiguous per content_id,
//!   starting at 1 (enforced at the repository boundary)
//! - versions are immutable once created; there is no update path

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ContentId, Timestamp, UserId, ValidationError};

/// Maximum length for a change summary.
pub const MAX_SUMMARY_LENGTH: usize = 500;

/// Monotonic, 1-based version number within a content item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VersionNumber(u32);

impl VersionNumber {
    /// The first version of any content item.
    pub fn first() -> Self {
        Self(1)
    }

    /// Creates a version number, rejecting zero.
    pub fn new(n: u32) -> Result<Self, ValidationError> {
        if n == 0 {
            return Err(ValidationError::invalid_format(
                "version_number",
                "version numbers start at 1",
            ));
        }
        Ok(Self(n))
    }

    /// Returns the next version number in the sequence.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw number.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// One immutable snapshot of a content item's body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentVersion {
    /// Content item this version belongs to.
    content_id: ContentId,

    /// Position in the per-content sequence.
    version_number: VersionNumber,

    /// Full body text at this version.
    body: String,

    /// Who authored this version.
    author_id: UserId,

    /// When the version was recorded.
    created_at: Timestamp,

    /// Optional human summary of what changed.
    change_summary: Option<String>,
}

impl ContentVersion {
    /// Creates a new version snapshot.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the change summary exceeds the length limit
    pub fn new(
        content_id: ContentId,
        version_number: VersionNumber,
        body: String,
        author_id: UserId,
        change_summary: Option<String>,
    ) -> Result<Self, ValidationError> {
        if let Some(summary) = &change_summary {
            if summary.len() > MAX_SUMMARY_LENGTH {
                return Err(ValidationError::invalid_format(
                    "change_summary",
                    format!("must be {} characters or less", MAX_SUMMARY_LENGTH),
                ));
            }
        }

        Ok(Self {
            content_id,
            version_number,
            body,
            author_id,
            created_at: Timestamp::now(),
            change_summary,
        })
    }

    /// Reconstitute a version from persistence (no validation).
    pub fn reconstitute(
        content_id: ContentId,
        version_number: VersionNumber,
        body: String,
        author_id: UserId,
        created_at: Timestamp,
        change_summary: Option<String>,
    ) -> Self {
        Self {
            content_id,
            version_number,
            body,
            author_id,
            created_at,
            change_summary,
        }
    }

    /// Builds the follow-up version that reverts this content to `source`.
    ///
    /// Revert never mutates history: it reads the source body and produces a
    /// brand-new version carrying a generated change summary.
    pub fn revert_from(source: &ContentVersion, next_number: VersionNumber, author_id: UserId) -> Self {
        Self {
            content_id: source.content_id,
            version_number: next_number,
            body: source.body.clone(),
            author_id,
            created_at: Timestamp::now(),
            change_summary: Some(format!("Reverted to version {}", source.version_number.get())),
        }
    }

    /// Returns the content ID.
    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }

    /// Returns the version number.
    pub fn version_number(&self) -> VersionNumber {
        self.version_number
    }

    /// Returns the body text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the author.
    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Returns when the version was recorded.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns the change summary, if any.
    pub fn change_summary(&self) -> Option<&str> {
        self.change_summary.as_deref()
    }

    /// Returns the metadata-only view (body elided) for listings.
    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            content_id: self.content_id,
            version_number: self.version_number,
            author_id: self.author_id.clone(),
            created_at: self.created_at,
            change_summary: self.change_summary.clone(),
            body_len: self.body.len(),
        }
    }
}

/// Metadata-only view of a version, for listings where the body is elided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub content_id: ContentId,
    pub version_number: VersionNumber,
    pub author_id: UserId,
    pub created_at: Timestamp,
    pub change_summary: Option<String>,
    pub body_len: usize,
}
