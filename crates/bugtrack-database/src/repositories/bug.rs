//! Bug repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bugtrack_core::error::{AppError, ErrorKind};
use bugtrack_core::result::AppResult;
use bugtrack_entity::bug::{Bug, BugPriority, BugStatus, CreateBug};

use crate::store::BugStore;

/// Repository for `bugs` rows.
#[derive(Debug, Clone)]
pub struct BugRepository {
    pool: PgPool,
}

impl BugRepository {
    /// Create a new bug repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Bug {id} not found"))
}

#[async_trait]
impl BugStore for BugRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bug>> {
        sqlx::query_as::<_, Bug>("SELECT * FROM bugs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find bug", e))
    }

    async fn create(&self, data: &CreateBug) -> AppResult<Bug> {
        sqlx::query_as::<_, Bug>(
            "INSERT INTO bugs (owner_id, title, description, priority, reported_by_email, reported_by_name, category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.priority)
        .bind(&data.reported_by_email)
        .bind(&data.reported_by_name)
        .bind(&data.category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create bug", e))
    }

    async fn update_status(&self, id: Uuid, status: BugStatus) -> AppResult<Bug> {
        sqlx::query_as::<_, Bug>(
            "UPDATE bugs SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update bug status", e))?
        .ok_or_else(|| not_found(id))
    }

    async fn update_priority(&self, id: Uuid, priority: BugPriority) -> AppResult<Bug> {
        sqlx::query_as::<_, Bug>(
            "UPDATE bugs SET priority = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(priority)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update bug priority", e)
        })?
        .ok_or_else(|| not_found(id))
    }

    async fn set_archived(&self, id: Uuid, archived: bool) -> AppResult<Bug> {
        sqlx::query_as::<_, Bug>(
            "UPDATE bugs SET is_archived = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(archived)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to archive bug", e))?
        .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM bugs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete bug", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM bugs WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check bug", e))
    }
}
