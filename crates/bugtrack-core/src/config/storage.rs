//! Bug image storage configuration.
//!
//! The bucket name is deliberately absent: bug images always live in the
//! fixed bucket defined by the storage crate.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider to use: `"local"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Secret used to sign object URLs.
    #[serde(default)]
    pub signing_secret: String,
    /// Base URL that signed object URLs are issued under.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Lifetime of issued signed URLs (default one year).
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_seconds: u64,
    /// Maximum number of objects returned when listing a bug's images.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
    /// Maximum length of each sanitized file name segment.
    #[serde(default = "default_max_segment_len")]
    pub max_name_segment_len: usize,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            signing_secret: String::new(),
            public_base_url: default_public_base_url(),
            signed_url_ttl_seconds: default_signed_url_ttl(),
            list_limit: default_list_limit(),
            max_name_segment_len: default_max_segment_len(),
            local: LocalStorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path under which each bucket gets a directory.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080/storage/v1".to_string()
}

fn default_signed_url_ttl() -> u64 {
    31_536_000 // 365 days
}

fn default_list_limit() -> usize {
    100
}

fn default_max_segment_len() -> usize {
    50
}

fn default_local_root() -> String {
    "./data/storage".to_string()
}
