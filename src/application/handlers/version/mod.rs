//! Version store operations.

mod append_version;
mod diff_versions;
mod list_versions;
mod prune_versions;
mod revert_to_version;

pub use append_version::{AppendVersionCommand, AppendVersionHandler, AppendVersionResult};
pub use diff_versions::{DiffVersionsHandler, DiffVersionsQuery};
pub use list_versions::{ListVersionsHandler, ListVersionsQuery};
pub use prune_versions::{PruneVersionsCommand, PruneVersionsHandler, PruneVersionsResult};
pub use revert_to_version::{
    RevertToVersionCommand, RevertToVersionHandler, RevertToVersionResult,
};
