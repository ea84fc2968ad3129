//! Application configuration schemas.
//!
//! All configuration structs are deserialized through the `config` crate
//! from TOML files plus `BUGTRACK__`-prefixed environment variables. Each
//! sub-module represents one configuration section.

pub mod database;
pub mod deletion;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::deletion::DeletionConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::storage::{LocalStorageConfig, StorageConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Relational store connection settings.
    pub database: DatabaseConfig,
    /// Bug image storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Deletion lifecycle settings.
    #[serde(default)]
    pub deletion: DeletionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml`, and environment
    /// variables such as `BUGTRACK__DATABASE__URL`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(&["config/default".to_string(), format!("config/{env}")])
    }

    /// Load configuration from an explicit list of files (later files win).
    pub fn load_from(files: &[String]) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        for file in files {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("BUGTRACK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let raw = r#"{ "database": { "url": "postgres://localhost/bugs" } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.storage.signed_url_ttl_seconds, 31_536_000);
        assert_eq!(config.storage.list_limit, 100);
        assert_eq!(config.deletion.in_flight_stall_seconds, 300);
        assert_eq!(config.logging.level, "info");
    }
}
