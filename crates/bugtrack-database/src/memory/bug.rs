//! In-memory `bugs` table.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use bugtrack_core::error::AppError;
use bugtrack_core::result::AppResult;
use bugtrack_entity::bug::{Bug, BugPriority, BugStatus, CreateBug};

use super::{FailureSwitch, round_trip};
use crate::store::BugStore;

/// In-memory bug store.
#[derive(Debug, Default)]
pub struct MemoryBugStore {
    rows: RwLock<HashMap<Uuid, Bug>>,
    /// Failure injection for `find`, `create`, `update`, and `delete`.
    pub failures: FailureSwitch,
}

impl MemoryBugStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row directly, bypassing failure injection.
    pub async fn seed(&self, bug: Bug) {
        self.rows.write().await.insert(bug.id, bug);
    }

    /// Number of rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether the store has no rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    async fn modify(&self, id: Uuid, apply: impl FnOnce(&mut Bug)) -> AppResult<Bug> {
        self.failures.check("update")?;
        round_trip().await;
        let mut rows = self.rows.write().await;
        let bug = rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Bug {id} not found")))?;
        apply(bug);
        bug.updated_at = Utc::now();
        Ok(bug.clone())
    }
}

#[async_trait]
impl BugStore for MemoryBugStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bug>> {
        self.failures.check("find")?;
        round_trip().await;
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn create(&self, data: &CreateBug) -> AppResult<Bug> {
        self.failures.check("create")?;
        round_trip().await;
        let now = Utc::now();
        let bug = Bug {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            title: data.title.clone(),
            description: data.description.clone(),
            status: BugStatus::Open,
            priority: data.priority,
            is_archived: false,
            reported_by_email: data.reported_by_email.clone(),
            reported_by_name: data.reported_by_name.clone(),
            category: data.category.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.insert(bug.id, bug.clone());
        Ok(bug)
    }

    async fn update_status(&self, id: Uuid, status: BugStatus) -> AppResult<Bug> {
        self.modify(id, |bug| bug.status = status).await
    }

    async fn update_priority(&self, id: Uuid, priority: BugPriority) -> AppResult<Bug> {
        self.modify(id, |bug| bug.priority = priority).await
    }

    async fn set_archived(&self, id: Uuid, archived: bool) -> AppResult<Bug> {
        self.modify(id, |bug| bug.is_archived = archived).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.failures.check("delete")?;
        round_trip().await;
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}
