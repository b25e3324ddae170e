//! PostgreSQL implementation of ApprovalActionRepository.
//!
//! Actions only ever get inserted; there is no update or delete path.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{ActionId, DomainError, ErrorCode, RequestId, Timestamp, UserId};
use crate::domain::workflow::{ActionKind, ApprovalAction, StageNumber};
use crate::ports::ApprovalActionRepository;

/// PostgreSQL implementation of ApprovalActionRepository.
#[derive(Clone)]
pub struct PostgresApprovalActionRepository {
    pool: PgPool,
}

impl PostgresApprovalActionRepository {
    /// Creates a new PostgresApprovalActionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApprovalActionRepository for PostgresApprovalActionRepository {
    async fn record(&self, action: &ApprovalAction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO approval_actions (
                id, request_id, stage_number, approver_id, action, feedback, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(action.id().as_uuid())
        .bind(action.request_id().as_uuid())
        .bind(action.stage_number().get() as i32)
        .bind(action.approver_id().as_str())
        .bind(action.action().as_str())
        .bind(action.feedback())
        .bind(action.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert approval action: {}", e),
            )
        })?;

        Ok(())
    }

    async fn list_for_request(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<ApprovalAction>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, request_id, stage_number, approver_id, action, feedback, created_at
            FROM approval_actions
            WHERE request_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(request_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list approval actions: {}", e),
            )
        })?;

        rows.into_iter().map(row_to_action).collect()
    }
}

fn str_to_action_kind(s: &str) -> Result<ActionKind, DomainError> {
    match s {
        "approve" => Ok(ActionKind::Approve),
        "reject" => Ok(ActionKind::Reject),
        "request_changes" => Ok(ActionKind::RequestChanges),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid action kind: {}", s),
        )),
    }
}

fn row_to_action(row: sqlx::postgres::PgRow) -> Result<ApprovalAction, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Failed to get id: {}", e))
    })?;

    let request_id: uuid::Uuid = row.try_get("request_id").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get request_id: {}", e),
        )
    })?;

    let stage_number: i32 = row.try_get("stage_number").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get stage_number: {}", e),
        )
    })?;

    let approver_id: String = row.try_get("approver_id").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get approver_id: {}", e),
        )
    })?;

    let action_str: String = row.try_get("action").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get action: {}", e),
        )
    })?;
    let action = str_to_action_kind(&action_str)?;

    let feedback: Option<String> = row.try_get("feedback").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get feedback: {}", e),
        )
    })?;

    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get created_at: {}", e),
        )
    })?;

    Ok(ApprovalAction::reconstitute(
        ActionId::from_uuid(id),
        RequestId::from_uuid(request_id),
        StageNumber::new(stage_number as u32).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid stored stage number: {}", e),
            )
        })?,
        UserId::new(approver_id).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid approver_id: {}", e),
            )
        })?,
        action,
        feedback,
        Timestamp::from_datetime(created_at),
    ))
}
