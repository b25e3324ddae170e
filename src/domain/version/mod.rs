//! Version module - append-only history of content bodies.
//!
//! Every edit to a content item's body becomes a new immutable
//! `ContentVersion`. Reverts append too; history is never rewritten.

mod diff;
mod errors;
mod events;
mod retention;
mod version;

pub use diff::{diff_bodies, DiffLine, VersionDiff};
pub use errors::VersionError;
pub use events::VersionAppended;
pub use retention::{RetentionPolicy, RETENTION_FLOOR_DAYS};
pub use version::{ContentVersion, VersionNumber, VersionSummary, MAX_SUMMARY_LENGTH};
