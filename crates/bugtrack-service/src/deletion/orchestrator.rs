//! Deletion orchestrator.
//!
//! Deletes a bug in a fixed order: snapshot, audit row, relational delete,
//! image cleanup. The first three are fail-fast: any failure aborts the run
//! and releases the in-flight guard, and each of them starts only while
//! the run still owns its guard. Cleanup runs after the bug is already
//! gone, so its failure becomes a warning on an otherwise successful result.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use bugtrack_core::error::AppError;
use bugtrack_database::store::{BugStore, DeletedBugStore};
use bugtrack_entity::activity::BugAction;
use bugtrack_entity::bug::Bug;
use bugtrack_entity::deleted::CreateDeletedBug;
use bugtrack_storage::BugImageGateway;

use super::registry::{DeleteLease, InFlightRegistry};
use super::state::{DeletionRun, DeletionState};
use crate::activity::ActivityLogger;
use crate::context::RequestContext;
use crate::error::LifecycleError;

/// Outcome of [`DeletionOrchestrator::delete_bug`].
#[derive(Debug, Clone, Serialize)]
pub struct DeleteBugResult {
    /// Whether the bug row was removed.
    pub success: bool,
    /// Id of the removed bug.
    pub deleted_bug_id: Option<Uuid>,
    /// Why the run aborted.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<LifecycleError>,
    /// Image cleanup failure on an otherwise successful run.
    #[serde(serialize_with = "serialize_error")]
    pub cleanup_warning: Option<LifecycleError>,
    /// States visited, in order.
    pub trace: Vec<DeletionState>,
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<LifecycleError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Runs audited, idempotent bug deletions.
#[derive(Debug, Clone)]
pub struct DeletionOrchestrator {
    bugs: Arc<dyn BugStore>,
    snapshots: Arc<dyn DeletedBugStore>,
    logger: Arc<ActivityLogger>,
    images: Arc<BugImageGateway>,
    registry: Arc<InFlightRegistry>,
}

impl DeletionOrchestrator {
    /// Creates a new orchestrator owning `registry` as its in-flight guard.
    pub fn new(
        bugs: Arc<dyn BugStore>,
        snapshots: Arc<dyn DeletedBugStore>,
        logger: Arc<ActivityLogger>,
        images: Arc<BugImageGateway>,
        registry: Arc<InFlightRegistry>,
    ) -> Self {
        Self {
            bugs,
            snapshots,
            logger,
            images,
            registry,
        }
    }

    /// The in-flight guard of this orchestrator.
    pub fn registry(&self) -> &InFlightRegistry {
        &self.registry
    }

    /// Delete `bug` on behalf of the acting user.
    pub async fn delete_bug(&self, bug: Option<&Bug>, ctx: &RequestContext) -> DeleteBugResult {
        let mut run = DeletionRun::new(bug.map(|b| b.id).unwrap_or_else(Uuid::nil));
        run.advance(DeletionState::Validating);

        let bug = match bug {
            Some(bug) if !bug.id.is_nil() => bug,
            Some(_) => {
                return self.reject(run, LifecycleError::Validation("Bug id is required".into()));
            }
            None => return self.reject(run, LifecycleError::Validation("Bug is required".into())),
        };

        let Some(lease) = self.registry.try_acquire(bug.id) else {
            warn!(bug_id = %bug.id, actor_id = %ctx.actor_id(), "Duplicate delete rejected");
            return self.reject(run, LifecycleError::AlreadyInProgress);
        };

        if !ctx.actor.can_modify(bug.owner_id) {
            warn!(
                bug_id = %bug.id,
                owner_id = %bug.owner_id,
                actor_id = %ctx.actor_id(),
                "Delete denied: actor is neither owner nor admin"
            );
            return self.abort(run, lease, LifecycleError::Permission);
        }

        let by_admin = ctx.is_admin();

        if let Err(e) = Self::step(&mut run, &lease, DeletionState::Snapshotting) {
            return self.abort(run, lease, e);
        }
        let snapshot = CreateDeletedBug::capture(bug, ctx.actor_id(), Utc::now(), by_admin);
        if let Err(e) = self.snapshots.insert(&snapshot).await {
            return self.abort(run, lease, LifecycleError::Snapshot(e));
        }

        if let Err(e) = Self::step(&mut run, &lease, DeletionState::Logging) {
            return self.abort(run, lease, e);
        }
        let action = BugAction::Deleted {
            title: bug.title.clone(),
            by_admin,
        };
        match self.logger.log_bug_activity(ctx, bug.id, action).await {
            Ok(outcome) if outcome.success => {}
            Ok(outcome) => {
                let message = outcome.error.unwrap_or_else(|| "unknown error".to_string());
                return self.abort(run, lease, LifecycleError::LogStore(message));
            }
            Err(violation) => return self.abort(run, lease, violation.into()),
        }

        if let Err(e) = Self::step(&mut run, &lease, DeletionState::Deleting) {
            return self.abort(run, lease, e);
        }
        match self.bugs.delete(bug.id).await {
            Ok(true) => {}
            Ok(false) => {
                let e = AppError::not_found(format!("Bug {} no longer exists", bug.id));
                return self.abort(run, lease, LifecycleError::Delete(e));
            }
            Err(e) => return self.abort(run, lease, LifecycleError::Delete(e)),
        }

        run.advance(DeletionState::CleaningUp);
        lease.set_state(DeletionState::CleaningUp);
        let cleanup = self.images.delete_bug_images(bug.owner_id, bug.id).await;
        let cleanup_warning = if cleanup.success {
            None
        } else {
            let message = cleanup.error.unwrap_or_else(|| "unknown error".to_string());
            warn!(
                bug_id = %bug.id,
                error = %message,
                "Bug deleted but its images were not cleaned up"
            );
            Some(LifecycleError::Cleanup(message))
        };

        run.advance(DeletionState::Done);
        lease.complete();
        info!(
            bug_id = %bug.id,
            actor_id = %ctx.actor_id(),
            by_admin,
            images_removed = cleanup.removed,
            "Bug deleted"
        );

        DeleteBugResult {
            success: true,
            deleted_bug_id: Some(bug.id),
            error: None,
            cleanup_warning,
            trace: run.into_trace(),
        }
    }

    /// Enter `next` if the run still owns its guard.
    fn step(
        run: &mut DeletionRun,
        lease: &DeleteLease<'_>,
        next: DeletionState,
    ) -> Result<(), LifecycleError> {
        if !lease.set_state(next) {
            warn!(bug_id = %run.bug_id, step = %next, "Delete guard lost to another run");
            return Err(LifecycleError::AlreadyInProgress);
        }
        run.advance(next);
        Ok(())
    }

    /// Fail without touching the guard (it is not ours to release).
    fn reject(&self, mut run: DeletionRun, error: LifecycleError) -> DeleteBugResult {
        run.advance(DeletionState::Failed);
        DeleteBugResult {
            success: false,
            deleted_bug_id: None,
            error: Some(error),
            cleanup_warning: None,
            trace: run.into_trace(),
        }
    }

    /// Fail after acquiring the guard: release it so the caller may retry.
    fn abort(
        &self,
        run: DeletionRun,
        lease: DeleteLease<'_>,
        error: LifecycleError,
    ) -> DeleteBugResult {
        let failed_in = run.state();
        lease.release();
        error!(
            bug_id = %run.bug_id,
            step = %failed_in,
            error = %error,
            "Bug delete aborted"
        );
        self.reject(run, error)
    }
}
