//! Deletion state machine.
//!
//! ```text
//! Idle -> Validating -> Snapshotting -> Logging -> Deleting -> CleaningUp -> Done
//!            |              |             |           |
//!            +--------------+-------------+-----------+--> Failed
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Step of one bug deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionState {
    /// Not started.
    Idle,
    /// Checking arguments, the in-flight guard, and permission.
    Validating,
    /// Writing the `deleted_bugs` snapshot.
    Snapshotting,
    /// Writing the `bug_deleted` audit row.
    Logging,
    /// Removing the `bugs` row.
    Deleting,
    /// Removing the bug's images.
    CleaningUp,
    /// Finished; the bug is gone.
    Done,
    /// Aborted before the bug was removed.
    Failed,
}

impl DeletionState {
    /// Whether the machine may move from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        use DeletionState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Snapshotting)
                | (Snapshotting, Logging)
                | (Logging, Deleting)
                | (Deleting, CleaningUp)
                | (CleaningUp, Done)
                | (Validating | Snapshotting | Logging | Deleting, Failed)
        )
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether the bug row has already been removed in this state.
    pub fn is_past_delete(self) -> bool {
        matches!(self, Self::CleaningUp | Self::Done)
    }

    /// Return the state as a snake_case string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Snapshotting => "snapshotting",
            Self::Logging => "logging",
            Self::Deleting => "deleting",
            Self::CleaningUp => "cleaning_up",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DeletionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One walk through the state machine, with every visited state kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionRun {
    /// The bug being deleted (nil when the bug was missing).
    pub bug_id: Uuid,
    state: DeletionState,
    trace: Vec<DeletionState>,
}

impl DeletionRun {
    /// Start a run in [`DeletionState::Idle`].
    pub fn new(bug_id: Uuid) -> Self {
        Self {
            bug_id,
            state: DeletionState::Idle,
            trace: vec![DeletionState::Idle],
        }
    }

    /// Current state.
    pub fn state(&self) -> DeletionState {
        self.state
    }

    /// Every state visited so far, in order.
    pub fn trace(&self) -> &[DeletionState] {
        &self.trace
    }

    /// Move to `next`. Returns `false` and stays put on an illegal move.
    pub fn advance(&mut self, next: DeletionState) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        self.trace.push(next);
        true
    }

    /// Consume the run, returning the trace.
    pub fn into_trace(self) -> Vec<DeletionState> {
        self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DeletionState::*;

    #[test]
    fn test_happy_path() {
        let mut run = DeletionRun::new(Uuid::new_v4());
        for next in [Validating, Snapshotting, Logging, Deleting, CleaningUp, Done] {
            assert!(run.advance(next), "{next} should be reachable");
        }
        assert!(run.state().is_terminal());
        assert_eq!(run.trace().len(), 7);
    }

    #[test]
    fn test_cleanup_cannot_fail() {
        assert!(!CleaningUp.can_transition_to(Failed));
        assert!(Deleting.can_transition_to(Failed));
        assert!(Validating.can_transition_to(Failed));
        assert!(!Idle.can_transition_to(Failed));
    }

    #[test]
    fn test_no_skipping_steps() {
        let mut run = DeletionRun::new(Uuid::new_v4());
        assert!(run.advance(Validating));
        assert!(!run.advance(Deleting));
        assert_eq!(run.state(), Validating);
        assert!(!Done.can_transition_to(Idle));
    }
}
