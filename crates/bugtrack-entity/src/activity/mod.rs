//! Activity (audit) log entities.

pub mod action;
pub mod model;

pub use action::{ActivityAction, BugAction, CommentAction, EntityType};
pub use model::{ActivityLogEntry, CreateActivityLogEntry};
