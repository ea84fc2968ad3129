//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use bugtrack_core::error::AppError;
use bugtrack_database::migration;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// List the migrations bundled with this binary
    List,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: &str) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            let config = super::load_config(config_path)?;
            let db = super::connect(&config).await?;
            println!("Running database migrations...");
            migration::run_migrations(db.pool()).await?;
            db.close().await;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::List => {
            for (version, description) in migration::embedded_migrations() {
                output::print_kv(&version.to_string(), &description);
            }
        }
    }

    Ok(())
}
