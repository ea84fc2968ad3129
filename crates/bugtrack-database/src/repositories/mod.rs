//! PostgreSQL implementations of the store traits.

pub mod activity;
pub mod bug;
pub mod deleted_bug;

pub use activity::ActivityLogRepository;
pub use bug::BugRepository;
pub use deleted_bug::DeletedBugRepository;
