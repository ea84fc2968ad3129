//! Connection settings for the PostgreSQL database holding the `bugs`,
//! `deleted_bugs`, and `activity_logs` tables.

use serde::{Deserialize, Serialize};

/// Pool settings shared by the CLI and the reconciler daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` URL of the bug tracker database.
    pub url: String,
    /// Pool ceiling.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connections kept open while idle.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection before failing.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Seconds before an unused connection is closed.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// The URL with its password replaced by `****`, for logs.
    pub fn redacted_url(&self) -> String {
        let url = self.url.as_str();
        let Some(at_pos) = url.rfind('@') else {
            return url.to_string();
        };
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        match url[..at_pos].rfind(':') {
            Some(colon_pos) if colon_pos > scheme_end => {
                format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..])
            }
            _ => url.to_string(),
        }
    }
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
