//! Campaign Content Core - Approval workflow and version control
//!
//! This crate implements the approval and versioning subsystem of the campaign
//! content platform: an ordered multi-stage sign-off engine over immutable,
//! append-only content versions. Surrounding concerns (authentication, content
//! CRUD, notification delivery, AI generation) are external collaborators
//! reached through ports.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
