//! In-memory `activity_logs` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use bugtrack_core::result::AppResult;
use bugtrack_core::types::pagination::{PageRequest, PageResponse};
use bugtrack_entity::activity::{ActivityLogEntry, CreateActivityLogEntry};

use super::{FailureSwitch, round_trip};
use crate::store::{ActivityFilter, ActivityLogStore};

/// In-memory, append-only activity log.
#[derive(Debug, Default)]
pub struct MemoryActivityLogStore {
    rows: RwLock<Vec<ActivityLogEntry>>,
    /// Failure injection for `insert` and `read`.
    pub failures: FailureSwitch,
}

impl MemoryActivityLogStore {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows in insertion order.
    pub async fn all(&self) -> Vec<ActivityLogEntry> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl ActivityLogStore for MemoryActivityLogStore {
    async fn insert(&self, data: &CreateActivityLogEntry) -> AppResult<ActivityLogEntry> {
        self.failures.check("insert")?;
        round_trip().await;
        let row = ActivityLogEntry {
            id: Uuid::new_v4(),
            actor_id: data.actor_id,
            actor_email: data.actor_email.clone(),
            entity_type: data.entity_type.as_str().to_string(),
            entity_id: data.entity_id,
            action: data.action.clone(),
            field: data.field.clone(),
            old_value: data.old_value.clone(),
            new_value: data.new_value.clone(),
            bug_id: data.bug_id,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn find_by_bug(&self, bug_id: Uuid) -> AppResult<Vec<ActivityLogEntry>> {
        self.failures.check("read")?;
        round_trip().await;
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|e| e.bug_id == Some(bug_id))
            .cloned()
            .collect())
    }

    async fn search(
        &self,
        filter: &ActivityFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ActivityLogEntry>> {
        self.failures.check("read")?;
        round_trip().await;
        let matched: Vec<ActivityLogEntry> = self
            .rows
            .read()
            .await
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn find_since(&self, since: DateTime<Utc>) -> AppResult<Vec<ActivityLogEntry>> {
        self.failures.check("read")?;
        round_trip().await;
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|e| e.created_at >= since)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugtrack_entity::activity::EntityType;

    fn entry(bug_id: Uuid, action: &str) -> CreateActivityLogEntry {
        CreateActivityLogEntry {
            actor_id: Uuid::new_v4(),
            actor_email: "dev@example.com".to_string(),
            entity_type: EntityType::Bug,
            entity_id: bug_id,
            action: action.to_string(),
            field: None,
            old_value: None,
            new_value: None,
            bug_id: Some(bug_id),
        }
    }

    #[tokio::test]
    async fn test_search_filters_and_orders_newest_first() {
        let store = MemoryActivityLogStore::new();
        let bug = Uuid::new_v4();
        store.insert(&entry(bug, "bug_created")).await.unwrap();
        store.insert(&entry(bug, "bug_archived")).await.unwrap();
        store.insert(&entry(Uuid::new_v4(), "bug_archived")).await.unwrap();

        let filter = ActivityFilter {
            bug_id: Some(bug),
            ..Default::default()
        };
        let page = store.search(&filter, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total_items, 2);
        assert_eq!(page.items[0].action, "bug_archived");
        assert_eq!(page.items[1].action, "bug_created");
    }

    #[tokio::test]
    async fn test_armed_insert_writes_nothing() {
        let store = MemoryActivityLogStore::new();
        store.failures.arm("insert");
        assert!(store.insert(&entry(Uuid::new_v4(), "x")).await.is_err());
        assert!(store.all().await.is_empty());
    }
}
