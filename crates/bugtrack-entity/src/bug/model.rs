//! Bug entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{BugPriority, BugStatus};

/// A reported bug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Bug {
    /// Unique bug identifier.
    pub id: Uuid,
    /// The user who reported the bug and owns its images.
    pub owner_id: Uuid,
    /// Short summary.
    pub title: String,
    /// Markdown description.
    pub description: Option<String>,
    /// Workflow status.
    pub status: BugStatus,
    /// Priority.
    pub priority: BugPriority,
    /// Whether the bug is hidden from the default listing.
    pub is_archived: bool,
    /// Reporter email at the time of reporting.
    pub reported_by_email: Option<String>,
    /// Reporter display name at the time of reporting.
    pub reported_by_name: Option<String>,
    /// Free-form category label.
    pub category: Option<String>,
    /// When the bug was created.
    pub created_at: DateTime<Utc>,
    /// When the bug was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Bug {
    /// Whether `user_id` owns this bug.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Data required to create a new bug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBug {
    /// Owner (the reporting user).
    pub owner_id: Uuid,
    /// Short summary.
    pub title: String,
    /// Markdown description.
    pub description: Option<String>,
    /// Priority.
    #[serde(default)]
    pub priority: BugPriority,
    /// Reporter email.
    pub reported_by_email: Option<String>,
    /// Reporter display name.
    pub reported_by_name: Option<String>,
    /// Category label.
    pub category: Option<String>,
}
