//! # bugtrack-database
//!
//! Store traits for the three relational tables the bug lifecycle touches
//! (`bugs`, `deleted_bugs`, `activity_logs`), their PostgreSQL
//! implementations, and in-memory implementations behind the `memory`
//! feature.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{ActivityFilter, ActivityLogStore, BugStore, DeletedBugStore};
