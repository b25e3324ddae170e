//! PostgreSQL implementation of WorkflowDefinitionRepository.
//!
//! A definition spans two tables: `workflow_definitions` for the header and
//! `workflow_stages` for the ordered chain. Saves run in a transaction so a
//! definition is never visible with a partial stage set.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    ApproverRole, CampaignId, DomainError, ErrorCode, Timestamp, UserId, WorkflowId,
};
use crate::domain::workflow::{ApprovalStage, ApprovalWorkflowDefinition, StageNumber};
use crate::ports::WorkflowDefinitionRepository;

/// PostgreSQL implementation of WorkflowDefinitionRepository.
#[derive(Clone)]
pub struct PostgresWorkflowDefinitionRepository {
    pool: PgPool,
}

impl PostgresWorkflowDefinitionRepository {
    /// Creates a new PostgresWorkflowDefinitionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_stages(&self, id: &WorkflowId) -> Result<Vec<ApprovalStage>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT stage_number, approver_role, approver_id, required
            FROM workflow_stages
            WHERE workflow_id = $1
            ORDER BY stage_number ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch workflow stages: {}", e),
            )
        })?;

        rows.into_iter().map(row_to_stage).collect()
    }

    async fn assemble(
        &self,
        row: sqlx::postgres::PgRow,
    ) -> Result<ApprovalWorkflowDefinition, DomainError> {
        let id: uuid::Uuid = row.try_get("id").map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to get id: {}", e))
        })?;

        let campaign_id: uuid::Uuid = row.try_get("campaign_id").map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to get campaign_id: {}", e),
            )
        })?;

        let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to get created_at: {}", e),
            )
        })?;

        let workflow_id = WorkflowId::from_uuid(id);
        let stages = self.load_stages(&workflow_id).await?;

        Ok(ApprovalWorkflowDefinition::reconstitute(
            workflow_id,
            CampaignId::from_uuid(campaign_id),
            stages,
            Timestamp::from_datetime(created_at),
        ))
    }
}

#[async_trait]
impl WorkflowDefinitionRepository for PostgresWorkflowDefinitionRepository {
    async fn save(&self, definition: &ApprovalWorkflowDefinition) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin transaction: {}", e),
            )
        })?;

        sqlx::query(
            "INSERT INTO workflow_definitions (id, campaign_id, created_at) VALUES ($1, $2, $3)",
        )
        .bind(definition.id().as_uuid())
        .bind(definition.campaign_id().as_uuid())
        .bind(definition.created_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert workflow definition: {}", e),
            )
        })?;

        for stage in definition.stages() {
            sqlx::query(
                r#"
                INSERT INTO workflow_stages (
                    workflow_id, stage_number, approver_role, approver_id, required
                ) VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(definition.id().as_uuid())
            .bind(stage.stage_number().get() as i32)
            .bind(stage.approver_role().as_str())
            .bind(stage.approver_id().map(|id| id.as_str()))
            .bind(stage.is_required())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to insert workflow stage: {}", e),
                )
            })?;
        }

        tx.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit workflow definition: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &WorkflowId,
    ) -> Result<Option<ApprovalWorkflowDefinition>, DomainError> {
        let row = sqlx::query(
            "SELECT id, campaign_id, created_at FROM workflow_definitions WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch workflow definition: {}", e),
            )
        })?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_current_for_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Option<ApprovalWorkflowDefinition>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, campaign_id, created_at
            FROM workflow_definitions
            WHERE campaign_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(campaign_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch current workflow definition: {}", e),
            )
        })?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }
}

fn row_to_stage(row: sqlx::postgres::PgRow) -> Result<ApprovalStage, DomainError> {
    let stage_number: i32 = row.try_get("stage_number").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get stage_number: {}", e),
        )
    })?;

    let approver_role: String = row.try_get("approver_role").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get approver_role: {}", e),
        )
    })?;

    let approver_id: Option<String> = row.try_get("approver_id").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get approver_id: {}", e),
        )
    })?;

    let required: bool = row.try_get("required").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get required: {}", e),
        )
    })?;

    let approver_id = approver_id
        .map(UserId::new)
        .transpose()
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid approver_id: {}", e),
            )
        })?;

    Ok(ApprovalStage::new(
        StageNumber::new(stage_number as u32).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid stored stage number: {}", e),
            )
        })?,
        ApproverRole::new(approver_role).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid approver_role: {}", e),
            )
        })?,
        approver_id,
        required,
    ))
}
