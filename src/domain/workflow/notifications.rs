//! Approver notification shaping.
//!
//! The engine decides WHO should hear about WHAT and publishes
//! `ApproverNotification` events; delivery (email, chat, digest batching)
//! belongs to an external gateway subscribed to the bus. Publishing is
//! fire-and-forget: a lost notification never blocks or rolls back a
//! transition.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EventId, RequestId, Timestamp, UserId};
use crate::domain_event;

use super::{ApprovalStage, StageNumber};

/// Why a recipient is being notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The request reached a stage the recipient can act on.
    StageReady,
    /// The request completed all stages (sent to the submitter).
    Approved,
    /// The request was rejected (sent to the submitter, with feedback).
    Rejected,
    /// An approver asked for changes (sent to the submitter).
    ChangesRequested,
    /// The request was withdrawn (sent to pending-stage approvers).
    Cancelled,
}

/// One notification addressed to one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproverNotification {
    pub event_id: EventId,
    pub request_id: RequestId,
    pub stage_number: StageNumber,
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub feedback: Option<String>,
    pub occurred_at: Timestamp,
}

domain_event!(
    ApproverNotification,
    event_type = "approval.notify.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "ApprovalRequest",
    occurred_at = occurred_at,
    event_id = event_id
);

impl ApproverNotification {
    pub fn new(
        request_id: RequestId,
        stage_number: StageNumber,
        recipient: UserId,
        kind: NotificationKind,
        feedback: Option<String>,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            request_id,
            stage_number,
            recipient,
            kind,
            feedback,
            occurred_at: Timestamp::now(),
        }
    }
}

/// Resolves who should be told a stage is ready.
///
/// A pinned approver is the sole recipient; otherwise every holder of the
/// stage's role gets one notification, deduplicated while preserving the
/// directory's order.
pub fn stage_recipients(stage: &ApprovalStage, role_holders: Vec<UserId>) -> Vec<UserId> {
    if let Some(pinned) = stage.approver_id() {
        return vec![pinned.clone()];
    }
    let mut seen = Vec::with_capacity(role_holders.len());
    for holder in role_holders {
        if !seen.contains(&holder) {
            seen.push(holder);
        }
    }
    seen
}
