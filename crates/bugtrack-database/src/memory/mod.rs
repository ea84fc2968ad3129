//! In-memory store implementations.
//!
//! Single-process stand-ins for the PostgreSQL repositories. Every call
//! yields to the scheduler once, the way a network round-trip would, so
//! concurrent callers interleave realistically. Individual operations can
//! be armed to fail through [`FailureSwitch`].

pub mod activity;
pub mod bug;
pub mod deleted_bug;

use dashmap::DashSet;

use bugtrack_core::error::AppError;
use bugtrack_core::result::AppResult;

pub use activity::MemoryActivityLogStore;
pub use bug::MemoryBugStore;
pub use deleted_bug::MemoryDeletedBugStore;

/// Set of operation names that currently fail.
#[derive(Debug, Default)]
pub struct FailureSwitch {
    armed: DashSet<&'static str>,
}

impl FailureSwitch {
    /// Make every subsequent call of `op` fail until [`Self::disarm`].
    pub fn arm(&self, op: &'static str) {
        self.armed.insert(op);
    }

    /// Let `op` succeed again.
    pub fn disarm(&self, op: &'static str) {
        self.armed.remove(op);
    }

    /// Fail with a database error if `op` is armed.
    pub fn check(&self, op: &'static str) -> AppResult<()> {
        if self.armed.contains(op) {
            return Err(AppError::database(format!("Simulated failure in {op}")));
        }
        Ok(())
    }
}

/// Suspend once, standing in for network latency.
pub(crate) async fn round_trip() {
    tokio::task::yield_now().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_switch() {
        let switch = FailureSwitch::default();
        assert!(switch.check("insert").is_ok());
        switch.arm("insert");
        assert!(switch.check("insert").is_err());
        assert!(switch.check("delete").is_ok());
        switch.disarm("insert");
        assert!(switch.check("insert").is_ok());
    }
}
