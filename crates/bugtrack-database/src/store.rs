//! Store traits for the relational tables.
//!
//! Every call is an independent round-trip; none of these traits offers a
//! multi-table transaction, and callers must not assume one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use bugtrack_core::result::AppResult;
use bugtrack_core::types::pagination::{PageRequest, PageResponse};
use bugtrack_entity::activity::{ActivityLogEntry, CreateActivityLogEntry};
use bugtrack_entity::bug::{Bug, BugPriority, BugStatus, CreateBug};
use bugtrack_entity::deleted::{CreateDeletedBug, DeletedBugSnapshot};

/// The `bugs` table.
#[async_trait]
pub trait BugStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a bug by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bug>>;

    /// Insert a new bug.
    async fn create(&self, data: &CreateBug) -> AppResult<Bug>;

    /// Set the workflow status and return the updated row.
    async fn update_status(&self, id: Uuid, status: BugStatus) -> AppResult<Bug>;

    /// Set the priority and return the updated row.
    async fn update_priority(&self, id: Uuid, priority: BugPriority) -> AppResult<Bug>;

    /// Set the archive flag and return the updated row.
    async fn set_archived(&self, id: Uuid, archived: bool) -> AppResult<Bug>;

    /// Hard-delete a bug. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Whether a bug with this id exists.
    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

/// The append-only `deleted_bugs` table.
#[async_trait]
pub trait DeletedBugStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a snapshot row.
    async fn insert(&self, data: &CreateDeletedBug) -> AppResult<DeletedBugSnapshot>;

    /// All snapshots taken for a given original bug id.
    async fn find_by_original_id(&self, bug_id: Uuid) -> AppResult<Vec<DeletedBugSnapshot>>;

    /// Snapshots with `deleted_at >= since`, newest first.
    async fn find_since(&self, since: DateTime<Utc>) -> AppResult<Vec<DeletedBugSnapshot>>;

    /// Page through snapshots, newest first.
    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<DeletedBugSnapshot>>;
}

/// Filter for activity log searches. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    /// Restrict to one actor.
    pub actor_id: Option<Uuid>,
    /// Restrict to one action tag.
    pub action: Option<String>,
    /// Restrict to one entity type.
    pub entity_type: Option<String>,
    /// Restrict to one bug's history.
    pub bug_id: Option<Uuid>,
}

impl ActivityFilter {
    /// Whether `entry` passes this filter.
    pub fn matches(&self, entry: &ActivityLogEntry) -> bool {
        self.actor_id.is_none_or(|id| entry.actor_id == id)
            && self.action.as_deref().is_none_or(|a| entry.action == a)
            && self
                .entity_type
                .as_deref()
                .is_none_or(|t| entry.entity_type == t)
            && self.bug_id.is_none_or(|id| entry.bug_id == Some(id))
    }
}

/// The append-only `activity_logs` table.
#[async_trait]
pub trait ActivityLogStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert one audit row.
    async fn insert(&self, data: &CreateActivityLogEntry) -> AppResult<ActivityLogEntry>;

    /// Full history of a bug, oldest first.
    async fn find_by_bug(&self, bug_id: Uuid) -> AppResult<Vec<ActivityLogEntry>>;

    /// Filtered search, newest first.
    async fn search(
        &self,
        filter: &ActivityFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ActivityLogEntry>>;

    /// Entries created at or after `since`, oldest first.
    async fn find_since(&self, since: DateTime<Utc>) -> AppResult<Vec<ActivityLogEntry>>;
}
