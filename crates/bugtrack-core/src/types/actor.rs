//! The authenticated user performing an action.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    /// May mutate or delete any bug.
    Admin,
    /// May mutate or delete only bugs they own.
    Member,
}

impl ActorRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" | "user" => Ok(Self::Member),
            _ => Err(AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: admin, member"
            ))),
        }
    }
}

/// Identity of the user on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Authenticated user id.
    pub id: Uuid,
    /// Email recorded on audit rows.
    pub email: String,
    /// Role at the time the session was established.
    pub role: ActorRole,
}

impl Actor {
    /// Create a new actor.
    pub fn new(id: Uuid, email: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    /// Shorthand for a non-admin actor.
    pub fn member(id: Uuid, email: impl Into<String>) -> Self {
        Self::new(id, email, ActorRole::Member)
    }

    /// Shorthand for an admin actor.
    pub fn admin(id: Uuid, email: impl Into<String>) -> Self {
        Self::new(id, email, ActorRole::Admin)
    }

    /// Whether this actor holds the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, ActorRole::Admin)
    }

    /// Whether this actor may mutate a record owned by `owner_id`.
    pub fn can_modify(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.id == owner_id
    }
}
