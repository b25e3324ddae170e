//! Approval request lifecycle status.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Status of an approval request.
///
/// `Pending` is the only non-terminal state; the current stage lives on the
/// request itself. Approved, Rejected, and Cancelled accept no further actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl ApprovalStatus {
    /// Returns true while the request still accepts actions.
    pub fn is_active(&self) -> bool {
        matches!(self, ApprovalStatus::Pending)
    }

    /// Returns the status as a stable string (storage and event payloads).
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Cancelled => "cancelled",
        }
    }
}

impl StateMachine for ApprovalStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ApprovalStatus::*;
        matches!(
            (self, target),
            (Pending, Approved) | (Pending, Rejected) | (Pending, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ApprovalStatus::*;
        match self {
            Pending => vec![Approved, Rejected, Cancelled],
            Approved | Rejected | Cancelled => vec![],
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
