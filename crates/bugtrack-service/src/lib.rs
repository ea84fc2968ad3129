//! # bugtrack-service
//!
//! Bug lifecycle services. Keeps the `bugs` table, the append-only audit
//! tables, and the bug image bucket consistent without a transaction
//! spanning them: every state change is paired with an audit row in a fixed
//! order, and deletion runs as an explicit state machine guarded per bug.
//!
//! Services follow constructor injection: all stores are provided at
//! construction time as `Arc<dyn ...>` trait objects.

pub mod activity;
pub mod context;
pub mod deletion;
pub mod error;
pub mod mutation;
pub mod reconcile;

pub use activity::{ActivityInput, ActivityLogger, ActivityOutcome, LogContractViolation};
pub use context::RequestContext;
pub use deletion::{DeleteBugResult, DeletionOrchestrator, DeletionState, InFlightRegistry};
pub use error::LifecycleError;
pub use mutation::{MutationFacade, MutationResult};
pub use reconcile::{OrphanedSnapshot, ReconcileReport, SnapshotReconciler};
