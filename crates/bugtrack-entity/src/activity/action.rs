//! Closed sets of audit actions per entity type.
//!
//! Each action variant determines the `action` tag and the
//! `field` / `old_value` / `new_value` columns of its audit row, so a
//! caller can only write rows whose shape matches the action.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use bugtrack_core::AppError;

use crate::bug::{BugPriority, BugStatus};

/// Kind of entity an audit row refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A bug.
    Bug,
    /// A comment on a bug.
    Comment,
}

impl EntityType {
    /// Return the entity type as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bug" => Ok(Self::Bug),
            "comment" => Ok(Self::Comment),
            _ => Err(AppError::validation(format!("Unknown entity type: '{s}'"))),
        }
    }
}

impl EntityType {
    /// Whether `tag` is an action recorded against this entity type.
    pub fn allows_action(&self, tag: &str) -> bool {
        match self {
            Self::Bug => BugAction::TAGS.contains(&tag),
            Self::Comment => CommentAction::TAGS.contains(&tag),
        }
    }
}

/// Actions recorded against a bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BugAction {
    /// The bug was reported.
    Created {
        /// Title at creation.
        title: String,
    },
    /// The workflow status changed.
    StatusChanged {
        /// Previous status.
        old: BugStatus,
        /// New status.
        new: BugStatus,
    },
    /// The priority changed.
    PriorityChanged {
        /// Previous priority.
        old: BugPriority,
        /// New priority.
        new: BugPriority,
    },
    /// The bug was archived.
    Archived,
    /// The bug was taken out of the archive.
    Restored,
    /// The bug was hard-deleted.
    Deleted {
        /// Title at deletion time.
        title: String,
        /// Whether an admin (rather than the owner) deleted it.
        by_admin: bool,
    },
}

impl BugAction {
    /// Every tag a bug action can produce.
    pub const TAGS: &'static [&'static str] = &[
        "bug_created",
        "status_changed",
        "priority_changed",
        "bug_archived",
        "bug_restored",
        "bug_deleted",
    ];

    /// The stored action tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Created { .. } => "bug_created",
            Self::StatusChanged { .. } => "status_changed",
            Self::PriorityChanged { .. } => "priority_changed",
            Self::Archived => "bug_archived",
            Self::Restored => "bug_restored",
            Self::Deleted { .. } => "bug_deleted",
        }
    }

    /// The field this action changed, if it is a field-level change.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::StatusChanged { .. } => Some("status"),
            Self::PriorityChanged { .. } => Some("priority"),
            Self::Archived | Self::Restored => Some("is_archived"),
            Self::Created { .. } | Self::Deleted { .. } => None,
        }
    }

    /// Value before the action.
    pub fn old_value(&self) -> Option<String> {
        match self {
            Self::StatusChanged { old, .. } => Some(old.as_str().to_string()),
            Self::PriorityChanged { old, .. } => Some(old.as_str().to_string()),
            Self::Archived => Some("false".to_string()),
            Self::Restored => Some("true".to_string()),
            Self::Deleted { title, .. } => Some(title.clone()),
            Self::Created { .. } => None,
        }
    }

    /// Value after the action.
    pub fn new_value(&self) -> Option<String> {
        match self {
            Self::Created { title } => Some(title.clone()),
            Self::StatusChanged { new, .. } => Some(new.as_str().to_string()),
            Self::PriorityChanged { new, .. } => Some(new.as_str().to_string()),
            Self::Archived => Some("true".to_string()),
            Self::Restored => Some("false".to_string()),
            Self::Deleted { by_admin: true, .. } => Some("deleted_by_admin".to_string()),
            Self::Deleted { by_admin: false, .. } => Some("deleted_by_owner".to_string()),
        }
    }
}

/// Actions recorded against a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentAction {
    /// A comment was posted.
    Added,
    /// A comment was edited.
    Edited,
    /// A comment was removed.
    Deleted,
}

impl CommentAction {
    /// Every tag a comment action can produce.
    pub const TAGS: &'static [&'static str] = &["comment_added", "comment_edited", "comment_deleted"];

    /// The stored action tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Added => "comment_added",
            Self::Edited => "comment_edited",
            Self::Deleted => "comment_deleted",
        }
    }
}

/// Any auditable action, tagged with the entity type it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", content = "action", rename_all = "lowercase")]
pub enum ActivityAction {
    /// A bug action.
    Bug(BugAction),
    /// A comment action.
    Comment(CommentAction),
}

impl ActivityAction {
    /// The entity type this action applies to.
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Bug(_) => EntityType::Bug,
            Self::Comment(_) => EntityType::Comment,
        }
    }

    /// The stored action tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Bug(a) => a.tag(),
            Self::Comment(a) => a.tag(),
        }
    }

    /// Changed field, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Bug(a) => a.field(),
            Self::Comment(_) => None,
        }
    }

    /// Previous value, if any.
    pub fn old_value(&self) -> Option<String> {
        match self {
            Self::Bug(a) => a.old_value(),
            Self::Comment(_) => None,
        }
    }

    /// New value, if any.
    pub fn new_value(&self) -> Option<String> {
        match self {
            Self::Bug(a) => a.new_value(),
            Self::Comment(_) => None,
        }
    }
}

impl From<BugAction> for ActivityAction {
    fn from(action: BugAction) -> Self {
        Self::Bug(action)
    }
}

impl From<CommentAction> for ActivityAction {
    fn from(action: CommentAction) -> Self {
        Self::Comment(action)
    }
}
