//! Deletion lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Settings for the bug deletion orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionConfig {
    /// Age after which a delete still holding its guard is reported as
    /// stalled. The guard stays with its run.
    #[serde(default = "default_in_flight_stall")]
    pub in_flight_stall_seconds: u64,
    /// How far back the reconciliation sweep looks for snapshots.
    #[serde(default = "default_reconcile_lookback")]
    pub reconcile_lookback_hours: i64,
    /// Interval between reconciliation sweeps in the reconciler binary.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_seconds: u64,
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            in_flight_stall_seconds: default_in_flight_stall(),
            reconcile_lookback_hours: default_reconcile_lookback(),
            reconcile_interval_seconds: default_reconcile_interval(),
        }
    }
}

fn default_in_flight_stall() -> u64 {
    300
}

fn default_reconcile_lookback() -> i64 {
    24
}

fn default_reconcile_interval() -> u64 {
    900
}
