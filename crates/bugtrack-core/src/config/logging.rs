//! Log output settings for the reconciler daemon.

use serde::{Deserialize, Serialize};

/// Line format written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Filter and format for `tracing-subscriber`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level for Bugtrack's own targets.
    #[serde(default = "default_level")]
    pub level: String,
    /// Level for sqlx, whose per-query events drown out lifecycle logs.
    #[serde(default = "default_sqlx_level")]
    pub sqlx_level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub fn directive(&self) -> String {
        format!("{},sqlx={}", self.level, self.sqlx_level)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            sqlx_level: default_sqlx_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_sqlx_level() -> String {
    "warn".to_string()
}
