//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the content approval domain.

mod command;
mod errors;
mod events;
mod ids;
mod role;
mod state_machine;
mod timestamp;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{ActionId, CampaignId, ContentId, RequestId, UserId, WorkflowId};
pub use role::ApproverRole;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
