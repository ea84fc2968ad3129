//! Deleted bug snapshot repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use bugtrack_core::error::{AppError, ErrorKind};
use bugtrack_core::result::AppResult;
use bugtrack_core::types::pagination::{PageRequest, PageResponse};
use bugtrack_entity::deleted::{CreateDeletedBug, DeletedBugSnapshot};

use crate::store::DeletedBugStore;

/// Repository for `deleted_bugs` rows. Insert-only.
#[derive(Debug, Clone)]
pub struct DeletedBugRepository {
    pool: PgPool,
}

impl DeletedBugRepository {
    /// Create a new snapshot repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeletedBugStore for DeletedBugRepository {
    async fn insert(&self, data: &CreateDeletedBug) -> AppResult<DeletedBugSnapshot> {
        sqlx::query_as::<_, DeletedBugSnapshot>(
            "INSERT INTO deleted_bugs \
             (original_bug_id, owner_id, title, description, status, priority, reported_by_email, \
              reported_by_name, deleted_by, deleted_at, original_created_at, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(data.original_bug_id)
        .bind(data.owner_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(&data.reported_by_email)
        .bind(&data.reported_by_name)
        .bind(data.deleted_by)
        .bind(data.deleted_at)
        .bind(data.original_created_at)
        .bind(&data.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert snapshot", e))
    }

    async fn find_by_original_id(&self, bug_id: Uuid) -> AppResult<Vec<DeletedBugSnapshot>> {
        sqlx::query_as::<_, DeletedBugSnapshot>(
            "SELECT * FROM deleted_bugs WHERE original_bug_id = $1 ORDER BY deleted_at ASC",
        )
        .bind(bug_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find snapshots", e))
    }

    async fn find_since(&self, since: DateTime<Utc>) -> AppResult<Vec<DeletedBugSnapshot>> {
        sqlx::query_as::<_, DeletedBugSnapshot>(
            "SELECT * FROM deleted_bugs WHERE deleted_at >= $1 ORDER BY deleted_at DESC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load recent snapshots", e)
        })
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<DeletedBugSnapshot>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM deleted_bugs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count snapshots", e)
            })?;

        let items = sqlx::query_as::<_, DeletedBugSnapshot>(
            "SELECT * FROM deleted_bugs ORDER BY deleted_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list snapshots", e))?;

        Ok(PageResponse::new(items, page, total as u64))
    }
}
