//! Activity log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::action::EntityType;

/// An immutable audit row recording one state-changing action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ActivityLogEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// The user who performed the action.
    pub actor_id: Uuid,
    /// The actor's email at the time of the action.
    pub actor_email: String,
    /// Kind of entity acted on (`"bug"`, `"comment"`).
    pub entity_type: String,
    /// The entity acted on. Never null.
    pub entity_id: Uuid,
    /// Action tag (e.g., `"bug_archived"`, `"status_changed"`).
    pub action: String,
    /// Field that changed, for field-level actions.
    pub field: Option<String>,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// Owning bug, denormalized for per-bug history queries.
    pub bug_id: Option<Uuid>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to insert an activity log row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateActivityLogEntry {
    /// Acting user.
    pub actor_id: Uuid,
    /// Acting user's email.
    pub actor_email: String,
    /// Entity kind.
    pub entity_type: EntityType,
    /// Entity id.
    pub entity_id: Uuid,
    /// Action tag.
    pub action: String,
    /// Changed field.
    pub field: Option<String>,
    /// Previous value.
    pub old_value: Option<String>,
    /// New value.
    pub new_value: Option<String>,
    /// Owning bug.
    pub bug_id: Option<Uuid>,
}
