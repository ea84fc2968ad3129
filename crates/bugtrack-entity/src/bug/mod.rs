//! Bug domain entities.

pub mod model;
pub mod status;

pub use model::{Bug, CreateBug};
pub use status::{BugPriority, BugStatus};
