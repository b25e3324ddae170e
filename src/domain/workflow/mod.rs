//! Workflow module - multi-stage approval over pinned content versions.
//!
//! A single generic engine drives every approval chain: stages are data
//! (`ApprovalStage` descriptors inside a definition), not subclassed workflow
//! types. The `ApprovalRequest` aggregate owns the per-request state machine.

mod action;
mod definition;
mod errors;
mod events;
mod notifications;
mod request;
mod status;

pub use action::{ActionKind, ApprovalAction};
pub use definition::{ApprovalStage, ApprovalWorkflowDefinition, StageNumber};
pub use errors::WorkflowError;
pub use events::{
    ApprovalCancelled, ApprovalChangesRequested, ApprovalGranted, ApprovalRejected,
    ApprovalStageAdvanced, ApprovalStageSkipped, ApprovalSubmitted,
};
pub use notifications::{stage_recipients, ApproverNotification, NotificationKind};
pub use request::{ApprovalRequest, StageOutcome};
pub use status::ApprovalStatus;
