//! PostgreSQL implementation of VersionRepository.
//!
//! Contiguity is enforced by a guarded insert: the row only lands when its
//! version number equals the current maximum plus one, evaluated inside the
//! statement. Losers of a race see zero rows affected and map to
//! `ConcurrentVersionConflict`.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{ContentId, DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::version::{ContentVersion, VersionNumber};
use crate::ports::VersionRepository;

/// PostgreSQL implementation of VersionRepository.
#[derive(Clone)]
pub struct PostgresVersionRepository {
    pool: PgPool,
}

impl PostgresVersionRepository {
    /// Creates a new PostgresVersionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionRepository for PostgresVersionRepository {
    async fn append(&self, version: &ContentVersion) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO content_versions (
                content_id, version_number, body, author_id, created_at, change_summary
            )
            SELECT $1, $2, $3, $4, $5, $6
            WHERE $2 = (
                SELECT COALESCE(MAX(version_number), 0) + 1
                FROM content_versions
                WHERE content_id = $1
            )
            "#,
        )
        .bind(version.content_id().as_uuid())
        .bind(version.version_number().get() as i32)
        .bind(version.body())
        .bind(version.author_id().as_str())
        .bind(version.created_at().as_datetime())
        .bind(version.change_summary())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::ConcurrentVersionConflict,
                    format!(
                        "{} for content {} was taken by a concurrent append",
                        version.version_number(),
                        version.content_id()
                    ),
                )
            } else {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to insert version: {}", e),
                )
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConcurrentVersionConflict,
                format!(
                    "{} is no longer the next version for content {}",
                    version.version_number(),
                    version.content_id()
                ),
            ));
        }

        Ok(())
    }

    async fn find(
        &self,
        content_id: &ContentId,
        number: VersionNumber,
    ) -> Result<Option<ContentVersion>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT content_id, version_number, body, author_id, created_at, change_summary
            FROM content_versions
            WHERE content_id = $1 AND version_number = $2
            "#,
        )
        .bind(content_id.as_uuid())
        .bind(number.get() as i32)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch version: {}", e),
            )
        })?;

        row.map(row_to_version).transpose()
    }

    async fn list_for_content(
        &self,
        content_id: &ContentId,
    ) -> Result<Vec<ContentVersion>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT content_id, version_number, body, author_id, created_at, change_summary
            FROM content_versions
            WHERE content_id = $1
            ORDER BY version_number ASC
            "#,
        )
        .bind(content_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list versions: {}", e),
            )
        })?;

        rows.into_iter().map(row_to_version).collect()
    }

    async fn latest_number(
        &self,
        content_id: &ContentId,
    ) -> Result<Option<VersionNumber>, DomainError> {
        let result: (Option<i32>,) = sqlx::query_as(
            "SELECT MAX(version_number) FROM content_versions WHERE content_id = $1",
        )
        .bind(content_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch latest version number: {}", e),
            )
        })?;

        match result.0 {
            Some(max) => {
                let number = VersionNumber::new(max as u32).map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Invalid stored version number: {}", e),
                    )
                })?;
                Ok(Some(number))
            }
            None => Ok(None),
        }
    }

    async fn prune_before(
        &self,
        content_id: &ContentId,
        cutoff: Timestamp,
    ) -> Result<u64, DomainError> {
        // The latest version is excluded from deletion regardless of age
        let result = sqlx::query(
            r#"
            DELETE FROM content_versions
            WHERE content_id = $1
              AND created_at < $2
              AND version_number < (
                  SELECT MAX(version_number)
                  FROM content_versions
                  WHERE content_id = $1
              )
            "#,
        )
        .bind(content_id.as_uuid())
        .bind(cutoff.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to prune versions: {}", e),
            )
        })?;

        Ok(result.rows_affected())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

fn row_to_version(row: sqlx::postgres::PgRow) -> Result<ContentVersion, DomainError> {
    let content_id: uuid::Uuid = row.try_get("content_id").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get content_id: {}", e),
        )
    })?;

    let version_number: i32 = row.try_get("version_number").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get version_number: {}", e),
        )
    })?;

    let body: String = row.try_get("body").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get body: {}", e),
        )
    })?;

    let author_id: String = row.try_get("author_id").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get author_id: {}", e),
        )
    })?;

    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get created_at: {}", e),
        )
    })?;

    let change_summary: Option<String> = row.try_get("change_summary").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get change_summary: {}", e),
        )
    })?;

    Ok(ContentVersion::reconstitute(
        ContentId::from_uuid(content_id),
        VersionNumber::new(version_number as u32).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid stored version number: {}", e),
            )
        })?,
        body,
        UserId::new(author_id).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid author_id: {}", e),
            )
        })?,
        Timestamp::from_datetime(created_at),
        change_summary,
    ))
}
