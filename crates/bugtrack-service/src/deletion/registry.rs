//! Per-orchestrator in-flight guard.
//!
//! Maps a bug id to the run currently deleting it. A run holds its entry
//! through a [`DeleteLease`] stamped with a generation number; every write
//! through the lease is ignored once the entry belongs to another
//! generation. Failed runs release their entry so the caller may retry, and
//! a lease dropped mid-flight (cancelled caller) releases it as well.
//! Completed runs keep their entry forever, so a late duplicate is rejected
//! instead of re-running against a bug that no longer exists.
//!
//! A live entry is never handed to a second run, however long it has been
//! held. Runs held longer than the stall threshold are reported by
//! [`InFlightRegistry::stalled`] and logged when a duplicate bounces off them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use tracing::warn;
use uuid::Uuid;

use super::state::DeletionState;

#[derive(Debug, Clone, Copy)]
struct Guard {
    generation: u64,
    state: DeletionState,
    acquired_at: Instant,
}

impl Guard {
    fn is_stalled(&self, threshold: Duration) -> bool {
        self.state != DeletionState::Done && self.acquired_at.elapsed() >= threshold
    }
}

/// Concurrency-token map for bug deletions.
#[derive(Debug)]
pub struct InFlightRegistry {
    guards: DashMap<Uuid, Guard>,
    generations: AtomicU64,
    stall_after: Duration,
}

impl InFlightRegistry {
    /// Create an empty registry that reports runs held longer than
    /// `stall_after` as stalled.
    pub fn new(stall_after: Duration) -> Self {
        Self {
            guards: DashMap::new(),
            generations: AtomicU64::new(0),
            stall_after,
        }
    }

    /// Claim `bug_id`. Returns `None` if another run holds it or a
    /// previous run completed.
    pub fn try_acquire(&self, bug_id: Uuid) -> Option<DeleteLease<'_>> {
        match self.guards.entry(bug_id) {
            Entry::Vacant(slot) => {
                let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
                slot.insert(Guard {
                    generation,
                    state: DeletionState::Validating,
                    acquired_at: Instant::now(),
                });
                Some(DeleteLease {
                    registry: self,
                    bug_id,
                    generation,
                    settled: false,
                })
            }
            Entry::Occupied(slot) => {
                let held = slot.get();
                if held.is_stalled(self.stall_after) {
                    warn!(
                        bug_id = %bug_id,
                        state = %held.state,
                        held_secs = held.acquired_at.elapsed().as_secs(),
                        "Delete still in flight past its stall threshold"
                    );
                }
                None
            }
        }
    }

    /// Drop the in-progress entry for `bug_id`, whoever holds it. Completed
    /// entries are kept; returns whether an entry was removed.
    ///
    /// The previous holder notices at its next step and aborts.
    pub fn release(&self, bug_id: Uuid) -> bool {
        self.guards
            .remove_if(&bug_id, |_, guard| guard.state != DeletionState::Done)
            .is_some()
    }

    /// State of the run holding `bug_id`, if any.
    pub fn state_of(&self, bug_id: Uuid) -> Option<DeletionState> {
        self.guards.get(&bug_id).map(|g| g.state)
    }

    /// Whether `bug_id` was deleted through this registry.
    pub fn is_retained(&self, bug_id: Uuid) -> bool {
        self.state_of(bug_id) == Some(DeletionState::Done)
    }

    /// Number of entries, in progress and completed.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Whether the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Bugs whose in-progress delete has been held past the stall threshold.
    pub fn stalled(&self) -> Vec<Uuid> {
        self.guards
            .iter()
            .filter(|entry| entry.value().is_stalled(self.stall_after))
            .map(|entry| *entry.key())
            .collect()
    }

    fn update(&self, bug_id: Uuid, generation: u64, state: DeletionState) -> bool {
        match self.guards.get_mut(&bug_id) {
            Some(mut guard) if guard.generation == generation => {
                guard.state = state;
                true
            }
            _ => false,
        }
    }

    fn remove(&self, bug_id: Uuid, generation: u64) -> bool {
        self.guards
            .remove_if(&bug_id, |_, guard| {
                guard.generation == generation && guard.state != DeletionState::Done
            })
            .is_some()
    }
}

/// One run's claim on a bug id.
///
/// Dropping a lease that was neither completed nor released releases it.
#[derive(Debug)]
pub struct DeleteLease<'a> {
    registry: &'a InFlightRegistry,
    bug_id: Uuid,
    generation: u64,
    settled: bool,
}

impl DeleteLease<'_> {
    /// The claimed bug id.
    pub fn bug_id(&self) -> Uuid {
        self.bug_id
    }

    /// Whether the registry entry still belongs to this lease.
    pub fn is_current(&self) -> bool {
        self.registry
            .guards
            .get(&self.bug_id)
            .is_some_and(|g| g.generation == self.generation)
    }

    /// Record the step this run has reached. Returns `false`, changing
    /// nothing, if the entry no longer belongs to this lease.
    pub fn set_state(&self, state: DeletionState) -> bool {
        self.registry.update(self.bug_id, self.generation, state)
    }

    /// Mark the bug as deleted. The entry is kept from now on.
    pub fn complete(mut self) -> bool {
        self.settled = true;
        self.registry
            .update(self.bug_id, self.generation, DeletionState::Done)
    }

    /// Give the bug id back so the caller may retry.
    pub fn release(mut self) -> bool {
        self.settled = true;
        self.registry.remove(self.bug_id, self.generation)
    }
}

impl Drop for DeleteLease<'_> {
    fn drop(&mut self) {
        if !self.settled && self.registry.remove(self.bug_id, self.generation) {
            warn!(bug_id = %self.bug_id, "Delete abandoned mid-flight; guard released");
        }
    }
}
