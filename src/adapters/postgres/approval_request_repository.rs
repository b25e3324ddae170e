//! PostgreSQL implementation of ApprovalRequestRepository.
//!
//! The one-active-request rule rides on a partial unique index over
//! `content_id WHERE status = 'pending'`; updates are guarded by the
//! aggregate's revision column for optimistic concurrency.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    ContentId, DomainError, ErrorCode, RequestId, Timestamp, UserId, WorkflowId,
};
use crate::domain::version::VersionNumber;
use crate::domain::workflow::{ApprovalRequest, ApprovalStatus, StageNumber};
use crate::ports::ApprovalRequestRepository;

/// PostgreSQL implementation of ApprovalRequestRepository.
#[derive(Clone)]
pub struct PostgresApprovalRequestRepository {
    pool: PgPool,
}

impl PostgresApprovalRequestRepository {
    /// Creates a new PostgresApprovalRequestRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: &RequestId) -> Result<bool, DomainError> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM approval_requests WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to check request existence: {}", e),
                )
            })?;

        Ok(result.0 > 0)
    }
}

#[async_trait]
impl ApprovalRequestRepository for PostgresApprovalRequestRepository {
    async fn insert_active(&self, request: &ApprovalRequest) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO approval_requests (
                id, content_id, workflow_id, version_number, current_stage,
                status, submitted_by, submitted_at, updated_at, revision
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(request.id().as_uuid())
        .bind(request.content_id().as_uuid())
        .bind(request.workflow_id().as_uuid())
        .bind(request.version_number().get() as i32)
        .bind(request.current_stage().get() as i32)
        .bind(request.status().as_str())
        .bind(request.submitted_by().as_str())
        .bind(request.submitted_at().as_datetime())
        .bind(request.updated_at().as_datetime())
        .bind(request.revision() as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::DuplicateActiveRequest,
                    format!(
                        "Content {} already has an active approval request",
                        request.content_id()
                    ),
                )
            } else {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to insert approval request: {}", e),
                )
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<ApprovalRequest>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, content_id, workflow_id, version_number, current_stage,
                   status, submitted_by, submitted_at, updated_at, revision
            FROM approval_requests
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch approval request: {}", e),
            )
        })?;

        row.map(row_to_request).transpose()
    }

    async fn find_active_by_content(
        &self,
        content_id: &ContentId,
    ) -> Result<Option<ApprovalRequest>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, content_id, workflow_id, version_number, current_stage,
                   status, submitted_by, submitted_at, updated_at, revision
            FROM approval_requests
            WHERE content_id = $1 AND status = 'pending'
            "#,
        )
        .bind(content_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch active approval request: {}", e),
            )
        })?;

        row.map(row_to_request).transpose()
    }

    async fn find_latest_by_content(
        &self,
        content_id: &ContentId,
    ) -> Result<Option<ApprovalRequest>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, content_id, workflow_id, version_number, current_stage,
                   status, submitted_by, submitted_at, updated_at, revision
            FROM approval_requests
            WHERE content_id = $1
            ORDER BY submitted_at DESC
            LIMIT 1
            "#,
        )
        .bind(content_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch latest approval request: {}", e),
            )
        })?;

        row.map(row_to_request).transpose()
    }

    async fn update(
        &self,
        request: &ApprovalRequest,
        expected_revision: u64,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE approval_requests SET
                current_stage = $3,
                status = $4,
                updated_at = $5,
                revision = $6
            WHERE id = $1 AND revision = $2
            "#,
        )
        .bind(request.id().as_uuid())
        .bind(expected_revision as i64)
        .bind(request.current_stage().get() as i32)
        .bind(request.status().as_str())
        .bind(request.updated_at().as_datetime())
        .bind(request.revision() as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update approval request: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            if self.exists(request.id()).await? {
                return Err(DomainError::new(
                    ErrorCode::ConcurrentUpdateConflict,
                    format!(
                        "Request {} was modified by another writer (expected revision {})",
                        request.id(),
                        expected_revision
                    ),
                ));
            }
            return Err(DomainError::new(
                ErrorCode::RequestNotFound,
                format!("Approval request not found: {}", request.id()),
            ));
        }

        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

fn str_to_status(s: &str) -> Result<ApprovalStatus, DomainError> {
    match s {
        "pending" => Ok(ApprovalStatus::Pending),
        "approved" => Ok(ApprovalStatus::Approved),
        "rejected" => Ok(ApprovalStatus::Rejected),
        "cancelled" => Ok(ApprovalStatus::Cancelled),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid approval status: {}", s),
        )),
    }
}

fn row_to_request(row: sqlx::postgres::PgRow) -> Result<ApprovalRequest, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Failed to get id: {}", e))
    })?;

    let content_id: uuid::Uuid = row.try_get("content_id").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get content_id: {}", e),
        )
    })?;

    let workflow_id: uuid::Uuid = row.try_get("workflow_id").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get workflow_id: {}", e),
        )
    })?;

    let version_number: i32 = row.try_get("version_number").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get version_number: {}", e),
        )
    })?;

    let current_stage: i32 = row.try_get("current_stage").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get current_stage: {}", e),
        )
    })?;

    let status_str: String = row.try_get("status").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get status: {}", e),
        )
    })?;
    let status = str_to_status(&status_str)?;

    let submitted_by: String = row.try_get("submitted_by").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get submitted_by: {}", e),
        )
    })?;

    let submitted_at: chrono::DateTime<chrono::Utc> = row.try_get("submitted_at").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get submitted_at: {}", e),
        )
    })?;

    let updated_at: chrono::DateTime<chrono::Utc> = row.try_get("updated_at").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get updated_at: {}", e),
        )
    })?;

    let revision: i64 = row.try_get("revision").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get revision: {}", e),
        )
    })?;

    Ok(ApprovalRequest::reconstitute(
        RequestId::from_uuid(id),
        ContentId::from_uuid(content_id),
        WorkflowId::from_uuid(workflow_id),
        VersionNumber::new(version_number as u32).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid stored version number: {}", e),
            )
        })?,
        StageNumber::new(current_stage as u32).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid stored stage number: {}", e),
            )
        })?,
        status,
        UserId::new(submitted_by).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid submitted_by: {}", e),
            )
        })?,
        Timestamp::from_datetime(submitted_at),
        Timestamp::from_datetime(updated_at),
        revision as u64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_conversion_roundtrips() {
        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
            ApprovalStatus::Cancelled,
        ] {
            assert_eq!(str_to_status(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn str_to_status_rejects_invalid() {
        assert!(str_to_status("in_review").is_err());
    }
}
