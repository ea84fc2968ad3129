//! Untyped activity input and the provenance contract it must satisfy.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use bugtrack_entity::activity::{CreateActivityLogEntry, EntityType};

/// A caller broke the audit contract. Rows that fail it are never written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogContractViolation {
    /// `action` was empty.
    #[error("Activity log contract violated: missing action for {entity_type} entity")]
    MissingAction {
        /// Entity type supplied with the empty action.
        entity_type: String,
    },

    /// `entity_type` was empty.
    #[error("Activity log contract violated: missing entity_type for action '{action}'")]
    MissingEntityType {
        /// Attempted action.
        action: String,
    },

    /// `entity_id` was absent or nil.
    #[error("Activity log contract violated: missing entity_id for action '{action}'")]
    MissingEntityId {
        /// Attempted action.
        action: String,
    },

    /// `entity_type` is not a known entity type.
    #[error("Activity log contract violated: unknown entity_type '{entity_type}' for action '{action}'")]
    UnknownEntityType {
        /// Supplied entity type.
        entity_type: String,
        /// Attempted action.
        action: String,
    },

    /// `action` is not recorded against `entity_type`.
    #[error("Activity log contract violated: action '{action}' does not apply to {entity_type}")]
    ActionMismatch {
        /// Entity type.
        entity_type: EntityType,
        /// Attempted action.
        action: String,
    },
}

/// One audit row as supplied by a caller that does not use the typed
/// actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityInput {
    /// Action tag, e.g. `bug_archived`.
    pub action: String,
    /// Entity type, `bug` or `comment`.
    pub entity_type: String,
    /// The entity the action applies to.
    pub entity_id: Option<Uuid>,
    /// Acting user.
    pub actor_id: Uuid,
    /// Acting user's email.
    pub actor_email: String,
    /// Owning bug; defaults to `entity_id` for bug entities.
    pub bug_id: Option<Uuid>,
    /// Changed field.
    pub field: Option<String>,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
}

impl ActivityInput {
    /// Check the contract and build the row to insert.
    pub fn validate(self) -> Result<CreateActivityLogEntry, LogContractViolation> {
        let action = self.action.trim().to_string();
        let entity_type = self.entity_type.trim().to_string();

        if action.is_empty() {
            return Err(LogContractViolation::MissingAction { entity_type });
        }
        if entity_type.is_empty() {
            return Err(LogContractViolation::MissingEntityType { action });
        }
        let Some(entity_id) = self.entity_id.filter(|id| !id.is_nil()) else {
            return Err(LogContractViolation::MissingEntityId { action });
        };
        let Ok(kind) = entity_type.parse::<EntityType>() else {
            return Err(LogContractViolation::UnknownEntityType {
                entity_type,
                action,
            });
        };
        if !kind.allows_action(&action) {
            return Err(LogContractViolation::ActionMismatch {
                entity_type: kind,
                action,
            });
        }

        let bug_id = match (self.bug_id, kind) {
            (Some(id), _) => Some(id),
            (None, EntityType::Bug) => Some(entity_id),
            (None, EntityType::Comment) => None,
        };

        Ok(CreateActivityLogEntry {
            actor_id: self.actor_id,
            actor_email: self.actor_email,
            entity_type: kind,
            entity_id,
            action,
            field: self.field,
            old_value: self.old_value,
            new_value: self.new_value,
            bug_id,
        })
    }
}
