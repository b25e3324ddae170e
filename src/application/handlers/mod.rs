//! Command handlers, one file per operation.

pub mod approval;
pub mod version;
