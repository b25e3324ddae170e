//! Approval engine operations.

mod cancel_approval_request;
mod get_approval_status;
mod record_approval_action;
mod skip_optional_stage;
mod submit_for_approval;

pub use cancel_approval_request::{
    CancelApprovalRequestCommand, CancelApprovalRequestHandler, CancelApprovalRequestResult,
};
pub use get_approval_status::{
    ApprovalStatusView, GetApprovalStatusHandler, GetApprovalStatusQuery,
};
pub use record_approval_action::{
    RecordApprovalActionCommand, RecordApprovalActionHandler, RecordApprovalActionResult,
};
pub use skip_optional_stage::{
    SkipOptionalStageCommand, SkipOptionalStageHandler, SkipOptionalStageResult,
};
pub use submit_for_approval::{
    SubmitForApprovalCommand, SubmitForApprovalHandler, SubmitForApprovalResult,
};
