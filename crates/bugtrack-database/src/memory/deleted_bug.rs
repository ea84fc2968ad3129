//! In-memory `deleted_bugs` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use bugtrack_core::result::AppResult;
use bugtrack_core::types::pagination::{PageRequest, PageResponse};
use bugtrack_entity::deleted::{CreateDeletedBug, DeletedBugSnapshot};

use super::{FailureSwitch, round_trip};
use crate::store::DeletedBugStore;

/// In-memory, append-only snapshot store.
#[derive(Debug, Default)]
pub struct MemoryDeletedBugStore {
    rows: RwLock<Vec<DeletedBugSnapshot>>,
    /// Failure injection for `insert` and `read`.
    pub failures: FailureSwitch,
}

impl MemoryDeletedBugStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows in insertion order.
    pub async fn all(&self) -> Vec<DeletedBugSnapshot> {
        self.rows.read().await.clone()
    }
}

fn newest_first(mut rows: Vec<DeletedBugSnapshot>) -> Vec<DeletedBugSnapshot> {
    rows.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
    rows
}

#[async_trait]
impl DeletedBugStore for MemoryDeletedBugStore {
    async fn insert(&self, data: &CreateDeletedBug) -> AppResult<DeletedBugSnapshot> {
        self.failures.check("insert")?;
        round_trip().await;
        let row = DeletedBugSnapshot {
            id: Uuid::new_v4(),
            original_bug_id: data.original_bug_id,
            owner_id: data.owner_id,
            title: data.title.clone(),
            description: data.description.clone(),
            status: data.status,
            priority: data.priority,
            reported_by_email: data.reported_by_email.clone(),
            reported_by_name: data.reported_by_name.clone(),
            deleted_by: data.deleted_by,
            deleted_at: data.deleted_at,
            original_created_at: data.original_created_at,
            metadata: data.metadata.clone(),
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn find_by_original_id(&self, bug_id: Uuid) -> AppResult<Vec<DeletedBugSnapshot>> {
        self.failures.check("read")?;
        round_trip().await;
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|s| s.original_bug_id == bug_id)
            .cloned()
            .collect())
    }

    async fn find_since(&self, since: DateTime<Utc>) -> AppResult<Vec<DeletedBugSnapshot>> {
        self.failures.check("read")?;
        round_trip().await;
        let rows = self
            .rows
            .read()
            .await
            .iter()
            .filter(|s| s.deleted_at >= since)
            .cloned()
            .collect();
        Ok(newest_first(rows))
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<DeletedBugSnapshot>> {
        self.failures.check("read")?;
        round_trip().await;
        let rows = newest_first(self.rows.read().await.clone());
        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }
}
