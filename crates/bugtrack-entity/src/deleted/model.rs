//! Deleted bug snapshot entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::bug::{Bug, BugPriority, BugStatus};

/// A point-in-time copy of a bug taken immediately before it was removed.
///
/// Rows are written once and never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DeletedBugSnapshot {
    /// Snapshot row identifier.
    pub id: Uuid,
    /// Id the bug had while it existed.
    pub original_bug_id: Uuid,
    /// Owner of the deleted bug.
    pub owner_id: Uuid,
    /// Title at deletion time.
    pub title: String,
    /// Description at deletion time.
    pub description: Option<String>,
    /// Status at deletion time.
    pub status: BugStatus,
    /// Priority at deletion time.
    pub priority: BugPriority,
    /// Reporter email.
    pub reported_by_email: Option<String>,
    /// Reporter display name.
    pub reported_by_name: Option<String>,
    /// The user who deleted the bug.
    pub deleted_by: Uuid,
    /// When the deletion was initiated.
    pub deleted_at: DateTime<Utc>,
    /// When the original bug was created.
    pub original_created_at: DateTime<Utc>,
    /// Archival flags, category, and deletion provenance.
    pub metadata: serde_json::Value,
}

/// Data required to insert a snapshot row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDeletedBug {
    /// Id of the bug being deleted.
    pub original_bug_id: Uuid,
    /// Owner of the bug.
    pub owner_id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Status.
    pub status: BugStatus,
    /// Priority.
    pub priority: BugPriority,
    /// Reporter email.
    pub reported_by_email: Option<String>,
    /// Reporter display name.
    pub reported_by_name: Option<String>,
    /// Deleting user.
    pub deleted_by: Uuid,
    /// Deletion time.
    pub deleted_at: DateTime<Utc>,
    /// Original creation time.
    pub original_created_at: DateTime<Utc>,
    /// Metadata bag.
    pub metadata: serde_json::Value,
}

impl CreateDeletedBug {
    /// Capture every user-visible field of `bug` plus deletion provenance.
    pub fn capture(bug: &Bug, deleted_by: Uuid, deleted_at: DateTime<Utc>, by_admin: bool) -> Self {
        Self {
            original_bug_id: bug.id,
            owner_id: bug.owner_id,
            title: bug.title.clone(),
            description: bug.description.clone(),
            status: bug.status,
            priority: bug.priority,
            reported_by_email: bug.reported_by_email.clone(),
            reported_by_name: bug.reported_by_name.clone(),
            deleted_by,
            deleted_at,
            original_created_at: bug.created_at,
            metadata: serde_json::json!({
                "is_archived": bug.is_archived,
                "category": bug.category,
                "deleted_by_admin": by_admin,
                "last_updated_at": bug.updated_at,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bug() -> Bug {
        let now = Utc::now();
        Bug {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Crash on save".to_string(),
            description: Some("Steps...".to_string()),
            status: BugStatus::InProgress,
            priority: BugPriority::High,
            is_archived: true,
            reported_by_email: Some("rep@example.com".to_string()),
            reported_by_name: Some("Rep".to_string()),
            category: Some("editor".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_capture_copies_fields_and_provenance() {
        let bug = sample_bug();
        let admin = Uuid::new_v4();
        let at = Utc::now();
        let snap = CreateDeletedBug::capture(&bug, admin, at, true);

        assert_eq!(snap.original_bug_id, bug.id);
        assert_eq!(snap.owner_id, bug.owner_id);
        assert_eq!(snap.title, bug.title);
        assert_eq!(snap.status, BugStatus::InProgress);
        assert_eq!(snap.deleted_by, admin);
        assert_eq!(snap.deleted_at, at);
        assert_eq!(snap.original_created_at, bug.created_at);
        assert_eq!(snap.metadata["is_archived"], serde_json::json!(true));
        assert_eq!(snap.metadata["category"], serde_json::json!("editor"));
        assert_eq!(snap.metadata["deleted_by_admin"], serde_json::json!(true));
    }
}
