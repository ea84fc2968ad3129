//! Audited, idempotent bug deletion.

pub mod orchestrator;
pub mod registry;
pub mod state;

pub use orchestrator::{DeleteBugResult, DeletionOrchestrator};
pub use registry::{DeleteLease, InFlightRegistry};
pub use state::{DeletionRun, DeletionState};
