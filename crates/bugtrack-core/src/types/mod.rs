//! Shared value types used across crates.

pub mod actor;
pub mod pagination;

pub use actor::{Actor, ActorRole};
pub use pagination::{PageRequest, PageResponse};
