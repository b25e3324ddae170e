//! PostgreSQL adapters - database implementations of the repository ports.
//!
//! - `PostgresVersionRepository` - append-only version history with
//!   contiguity enforced by a guarded insert
//! - `PostgresApprovalRequestRepository` - request aggregates with a partial
//!   unique index for the one-active-request rule and revision-guarded updates
//! - `PostgresApprovalActionRepository` - the append-only action audit log
//! - `PostgresWorkflowDefinitionRepository` - immutable stage configurations

mod approval_action_repository;
mod approval_request_repository;
mod version_repository;
mod workflow_definition_repository;

pub use approval_action_repository::PostgresApprovalActionRepository;
pub use approval_request_repository::PostgresApprovalRequestRepository;
pub use version_repository::PostgresVersionRepository;
pub use workflow_definition_repository::PostgresWorkflowDefinitionRepository;
