//! Activity logging: the single path through which audit rows are written.

pub mod contract;
pub mod logger;

pub use contract::{ActivityInput, LogContractViolation};
pub use logger::{ActivityLogger, ActivityOutcome};
