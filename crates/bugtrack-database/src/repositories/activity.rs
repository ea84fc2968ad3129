//! Activity log repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use bugtrack_core::error::{AppError, ErrorKind};
use bugtrack_core::result::AppResult;
use bugtrack_core::types::pagination::{PageRequest, PageResponse};
use bugtrack_entity::activity::{ActivityLogEntry, CreateActivityLogEntry};

use crate::store::{ActivityFilter, ActivityLogStore};

/// Repository for `activity_logs` rows.
#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    /// Create a new activity log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count entries with a given action tag since `since`.
    pub async fn count_actions_since(&self, action: &str, since: DateTime<Utc>) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM activity_logs WHERE action = $1 AND created_at >= $2",
        )
        .bind(action)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count activity", e))
    }
}

/// Build the `WHERE` clause for a filter, numbering placeholders from `$1`.
///
/// Returns the clause and the index of the next free placeholder.
fn where_clause(filter: &ActivityFilter) -> (String, u32) {
    let mut conditions = Vec::new();
    let mut idx = 1u32;

    for (present, column) in [
        (filter.actor_id.is_some(), "actor_id"),
        (filter.action.is_some(), "action"),
        (filter.entity_type.is_some(), "entity_type"),
        (filter.bug_id.is_some(), "bug_id"),
    ] {
        if present {
            conditions.push(format!("{column} = ${idx}"));
            idx += 1;
        }
    }

    if conditions.is_empty() {
        (String::new(), idx)
    } else {
        (format!("WHERE {}", conditions.join(" AND ")), idx)
    }
}

#[async_trait]
impl ActivityLogStore for ActivityLogRepository {
    async fn insert(&self, data: &CreateActivityLogEntry) -> AppResult<ActivityLogEntry> {
        sqlx::query_as::<_, ActivityLogEntry>(
            "INSERT INTO activity_logs \
             (actor_id, actor_email, entity_type, entity_id, action, field, old_value, new_value, bug_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(data.actor_id)
        .bind(&data.actor_email)
        .bind(data.entity_type.as_str())
        .bind(data.entity_id)
        .bind(&data.action)
        .bind(&data.field)
        .bind(&data.old_value)
        .bind(&data.new_value)
        .bind(data.bug_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert activity log", e))
    }

    async fn find_by_bug(&self, bug_id: Uuid) -> AppResult<Vec<ActivityLogEntry>> {
        sqlx::query_as::<_, ActivityLogEntry>(
            "SELECT * FROM activity_logs WHERE bug_id = $1 ORDER BY created_at ASC",
        )
        .bind(bug_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load bug history", e))
    }

    async fn search(
        &self,
        filter: &ActivityFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ActivityLogEntry>> {
        let (clause, next) = where_clause(filter);
        let count_sql = format!("SELECT COUNT(*) FROM activity_logs {clause}");
        let select_sql = format!(
            "SELECT * FROM activity_logs {clause} ORDER BY created_at DESC LIMIT ${next} OFFSET ${}",
            next + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, ActivityLogEntry>(&select_sql);

        if let Some(id) = filter.actor_id {
            count_query = count_query.bind(id);
            select_query = select_query.bind(id);
        }
        if let Some(action) = &filter.action {
            count_query = count_query.bind(action.clone());
            select_query = select_query.bind(action.clone());
        }
        if let Some(entity_type) = &filter.entity_type {
            count_query = count_query.bind(entity_type.clone());
            select_query = select_query.bind(entity_type.clone());
        }
        if let Some(id) = filter.bug_id {
            count_query = count_query.bind(id);
            select_query = select_query.bind(id);
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count activity entries", e)
        })?;

        let entries = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to search activity log", e)
            })?;

        Ok(PageResponse::new(entries, page, total as u64))
    }

    async fn find_since(&self, since: DateTime<Utc>) -> AppResult<Vec<ActivityLogEntry>> {
        sqlx::query_as::<_, ActivityLogEntry>(
            "SELECT * FROM activity_logs WHERE created_at >= $1 ORDER BY created_at ASC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load recent activity", e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause_numbers_placeholders() {
        let (clause, next) = where_clause(&ActivityFilter::default());
        assert_eq!(clause, "");
        assert_eq!(next, 1);

        let filter = ActivityFilter {
            action: Some("bug_deleted".to_string()),
            bug_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let (clause, next) = where_clause(&filter);
        assert_eq!(clause, "WHERE action = $1 AND bug_id = $2");
        assert_eq!(next, 3);
    }
}
