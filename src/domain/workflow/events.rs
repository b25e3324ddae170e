//! Domain events emitted by the approval engine.
//!
//! Every request transition produces exactly one of these. Handlers publish
//! them after the state change has been committed; a publish failure is
//! logged and never rolls the transition back.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContentId, EventId, RequestId, Timestamp, UserId, WorkflowId};
use crate::domain::version::VersionNumber;
use crate::domain_event;

use super::StageNumber;

/// A content version entered its approval chain at stage 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalSubmitted {
    pub event_id: EventId,
    pub request_id: RequestId,
    pub content_id: ContentId,
    pub workflow_id: WorkflowId,
    pub version_number: VersionNumber,
    pub submitted_by: UserId,
    pub occurred_at: Timestamp,
}

domain_event!(
    ApprovalSubmitted,
    event_type = "approval.submitted.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "ApprovalRequest",
    occurred_at = occurred_at,
    event_id = event_id
);

/// A stage was signed off and the request moved to the next one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalStageAdvanced {
    pub event_id: EventId,
    pub request_id: RequestId,
    pub content_id: ContentId,
    pub approved_stage: StageNumber,
    pub current_stage: StageNumber,
    pub approver_id: UserId,
    pub occurred_at: Timestamp,
}

domain_event!(
    ApprovalStageAdvanced,
    event_type = "approval.stage_advanced.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "ApprovalRequest",
    occurred_at = occurred_at,
    event_id = event_id
);

/// An optional stage was skipped without sign-off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalStageSkipped {
    pub event_id: EventId,
    pub request_id: RequestId,
    pub content_id: ContentId,
    pub skipped_stage: StageNumber,
    pub occurred_at: Timestamp,
}

domain_event!(
    ApprovalStageSkipped,
    event_type = "approval.stage_skipped.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "ApprovalRequest",
    occurred_at = occurred_at,
    event_id = event_id
);

/// The final stage signed off; the version is fully approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalGranted {
    pub event_id: EventId,
    pub request_id: RequestId,
    pub content_id: ContentId,
    pub version_number: VersionNumber,
    pub approver_id: UserId,
    pub occurred_at: Timestamp,
}

domain_event!(
    ApprovalGranted,
    event_type = "approval.approved.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "ApprovalRequest",
    occurred_at = occurred_at,
    event_id = event_id
);

/// The request was rejected. Carries the mandatory feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRejected {
    pub event_id: EventId,
    pub request_id: RequestId,
    pub content_id: ContentId,
    pub rejected_stage: StageNumber,
    pub approver_id: UserId,
    pub feedback: String,
    pub occurred_at: Timestamp,
}

domain_event!(
    ApprovalRejected,
    event_type = "approval.rejected.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "ApprovalRequest",
    occurred_at = occurred_at,
    event_id = event_id
);

/// An approver asked for changes; the request stays pending at its stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalChangesRequested {
    pub event_id: EventId,
    pub request_id: RequestId,
    pub content_id: ContentId,
    pub stage_number: StageNumber,
    pub approver_id: UserId,
    pub feedback: Option<String>,
    pub occurred_at: Timestamp,
}

domain_event!(
    ApprovalChangesRequested,
    event_type = "approval.changes_requested.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "ApprovalRequest",
    occurred_at = occurred_at,
    event_id = event_id
);

/// The request was withdrawn before completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalCancelled {
    pub event_id: EventId,
    pub request_id: RequestId,
    pub content_id: ContentId,
    pub cancelled_by: UserId,
    pub occurred_at: Timestamp,
}

domain_event!(
    ApprovalCancelled,
    event_type = "approval.cancelled.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "ApprovalRequest",
    occurred_at = occurred_at,
    event_id = event_id
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SerializableDomainEvent;

    #[test]
    fn submitted_envelope_routes_by_request() {
        let request_id = RequestId::new();
        let event = ApprovalSubmitted {
            event_id: EventId::new(),
            request_id,
            content_id: ContentId::new(),
            workflow_id: WorkflowId::new(),
            version_number: VersionNumber::first(),
            submitted_by: UserId::new("creator-1").unwrap(),
            occurred_at: Timestamp::now(),
        };

        let envelope = event.to_envelope();
        assert_eq!(envelope.event_type, "approval.submitted.v1");
        assert_eq!(envelope.aggregate_id, request_id.to_string());
        assert_eq!(envelope.aggregate_type, "ApprovalRequest");
        assert_eq!(envelope.schema_version, 1);
    }

    #[test]
    fn rejected_payload_carries_feedback() {
        let event = ApprovalRejected {
            event_id: EventId::new(),
            request_id: RequestId::new(),
            content_id: ContentId::new(),
            rejected_stage: StageNumber::first(),
            approver_id: UserId::new("editor-1").unwrap(),
            feedback: "tone is off-brand".to_string(),
            occurred_at: Timestamp::now(),
        };

        let envelope = event.to_envelope();
        assert_eq!(envelope.payload["feedback"], "tone is off-brand");
    }

    #[test]
    fn stage_advanced_names_both_stages() {
        let event = ApprovalStageAdvanced {
            event_id: EventId::new(),
            request_id: RequestId::new(),
            content_id: ContentId::new(),
            approved_stage: StageNumber::first(),
            current_stage: StageNumber::first().next(),
            approver_id: UserId::new("creator-1").unwrap(),
            occurred_at: Timestamp::now(),
        };

        let envelope = event.to_envelope();
        assert_eq!(envelope.payload["approved_stage"], 1);
        assert_eq!(envelope.payload["current_stage"], 2);
    }
}
