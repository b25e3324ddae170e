//! Ports - interfaces between the application core and the outside world.
//!
//! Following hexagonal architecture, ports define WHAT the application needs
//! while adapters define HOW those needs are met.

pub mod approval_action_repository;
pub mod approval_request_repository;
pub mod approver_directory;
pub mod content_gateway;
pub mod event_publisher;
pub mod event_subscriber;
pub mod version_repository;
pub mod workflow_definition_repository;

pub use approval_action_repository::ApprovalActionRepository;
pub use approval_request_repository::ApprovalRequestRepository;
pub use approver_directory::ApproverDirectory;
pub use content_gateway::ContentGateway;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventHandler, EventSubscriber};
pub use version_repository::VersionRepository;
pub use workflow_definition_repository::WorkflowDefinitionRepository;
