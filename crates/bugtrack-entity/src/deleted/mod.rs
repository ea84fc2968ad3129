//! Append-only snapshots of hard-deleted bugs.

pub mod model;

pub use model::{CreateDeletedBug, DeletedBugSnapshot};
