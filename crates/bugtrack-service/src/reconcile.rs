//! Detection of snapshots whose bug was never removed.
//!
//! A delete that stops between the snapshot/log steps and the relational
//! delete leaves a `deleted_bugs` row for a bug that still exists. The
//! reconciler finds such rows and reports them; it never deletes anything.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use bugtrack_core::error::AppError;
use bugtrack_database::store::{BugStore, DeletedBugStore};

/// A snapshot that claims a deletion which did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedSnapshot {
    /// Snapshot row id.
    pub snapshot_id: Uuid,
    /// The bug that still exists.
    pub original_bug_id: Uuid,
    /// Title captured in the snapshot.
    pub title: String,
    /// Who attempted the delete.
    pub deleted_by: Uuid,
    /// When the delete was attempted.
    pub deleted_at: DateTime<Utc>,
}

/// Result of one reconciliation sweep.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// Lower bound of the sweep window.
    pub since: DateTime<Utc>,
    /// Snapshots examined.
    pub scanned: usize,
    /// Snapshots whose bug still exists, newest first.
    pub orphaned: Vec<OrphanedSnapshot>,
}

impl ReconcileReport {
    /// Whether every examined snapshot matched a completed delete.
    pub fn is_clean(&self) -> bool {
        self.orphaned.is_empty()
    }
}

/// Sweeps recent snapshots for deletions that never completed.
#[derive(Debug, Clone)]
pub struct SnapshotReconciler {
    bugs: Arc<dyn BugStore>,
    snapshots: Arc<dyn DeletedBugStore>,
}

impl SnapshotReconciler {
    /// Creates a new reconciler.
    pub fn new(bugs: Arc<dyn BugStore>, snapshots: Arc<dyn DeletedBugStore>) -> Self {
        Self { bugs, snapshots }
    }

    /// Examine snapshots taken within the last `lookback`.
    pub async fn run(&self, lookback: Duration) -> Result<ReconcileReport, AppError> {
        let since = Utc::now() - lookback;
        let snapshots = self.snapshots.find_since(since).await?;

        let candidates: Vec<Uuid> = snapshots
            .iter()
            .map(|s| s.original_bug_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let present = try_join_all(candidates.iter().map(|id| self.bugs.exists(*id))).await?;
        let surviving: HashSet<Uuid> = candidates
            .into_iter()
            .zip(present)
            .filter_map(|(id, exists)| exists.then_some(id))
            .collect();

        let orphaned: Vec<OrphanedSnapshot> = snapshots
            .iter()
            .filter(|s| surviving.contains(&s.original_bug_id))
            .map(|s| OrphanedSnapshot {
                snapshot_id: s.id,
                original_bug_id: s.original_bug_id,
                title: s.title.clone(),
                deleted_by: s.deleted_by,
                deleted_at: s.deleted_at,
            })
            .collect();

        for finding in &orphaned {
            warn!(
                snapshot_id = %finding.snapshot_id,
                bug_id = %finding.original_bug_id,
                deleted_by = %finding.deleted_by,
                deleted_at = %finding.deleted_at,
                "Snapshot recorded for a bug that still exists"
            );
        }
        info!(
            since = %since,
            scanned = snapshots.len(),
            orphaned = orphaned.len(),
            "Snapshot reconciliation finished"
        );

        Ok(ReconcileReport {
            since,
            scanned: snapshots.len(),
            orphaned,
        })
    }
}
