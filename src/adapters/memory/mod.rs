//! In-memory adapters for deterministic tests.
//!
//! Each adapter enforces the same invariants its Postgres counterpart
//! enforces at the database level (contiguous version numbers, one active
//! request per content item, revision-guarded updates), so integration
//! tests exercise the real concurrency contracts without a database.

mod approval_action_repository;
mod approval_request_repository;
mod approver_directory;
mod content_gateway;
mod version_repository;
mod workflow_definition_repository;

pub use approval_action_repository::InMemoryApprovalActionRepository;
pub use approval_request_repository::InMemoryApprovalRequestRepository;
pub use approver_directory::InMemoryApproverDirectory;
pub use content_gateway::InMemoryContentGateway;
pub use version_repository::InMemoryVersionRepository;
pub use workflow_definition_repository::InMemoryWorkflowDefinitionRepository;
