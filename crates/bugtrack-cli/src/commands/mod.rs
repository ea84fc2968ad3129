//! CLI command definitions and dispatch.

pub mod audit;
pub mod bug;
pub mod deleted;
pub mod migrate;
pub mod reconcile;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use bugtrack_core::config::AppConfig;
use bugtrack_core::error::AppError;
use bugtrack_database::DatabasePool;

/// Bugtrack: bug lifecycle administration
#[derive(Debug, Parser)]
#[command(name = "bugtrack", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Log service activity to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Activity log
    Audit(audit::AuditArgs),
    /// Deleted bug snapshots
    Deleted(deleted::DeletedArgs),
    /// Bug administration
    Bug(bug::BugArgs),
    /// Report snapshots of deletes that never completed
    Reconcile(reconcile::ReconcileArgs),
}

impl Cli {
    /// Log filter for the chosen verbosity; `RUST_LOG` takes precedence.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info,sqlx=warn",
            _ => "debug",
        }
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Audit(args) => audit::execute(args, &self.config, self.format).await,
            Commands::Deleted(args) => deleted::execute(args, &self.config, self.format).await,
            Commands::Bug(args) => bug::execute(args, &self.config, self.format).await,
            Commands::Reconcile(args) => reconcile::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    tracing::debug!(path = config_path, "Loading configuration");
    AppConfig::load_from(&[config_path.to_string()])
}

/// Helper: connect to the database named in the configuration
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: parse an optional UUID argument
pub fn parse_uuid(value: Option<&str>, what: &str) -> Result<Option<uuid::Uuid>, AppError> {
    value
        .map(|v| {
            uuid::Uuid::parse_str(v)
                .map_err(|e| AppError::validation(format!("Invalid {what} UUID: {e}")))
        })
        .transpose()
}
