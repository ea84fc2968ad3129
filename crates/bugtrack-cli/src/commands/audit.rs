//! Activity log CLI commands.

use clap::{Args, Subcommand};
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use bugtrack_core::error::AppError;
use bugtrack_core::types::pagination::PageRequest;
use bugtrack_database::ActivityFilter;
use bugtrack_entity::activity::ActivityLogEntry;
use bugtrack_service::ActivityLogger;

/// Arguments for audit commands
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Audit subcommand
    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands
#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Search the activity log, newest first
    Search {
        /// Filter by bug ID
        #[arg(short, long)]
        bug: Option<String>,
        /// Filter by actor (user ID)
        #[arg(long)]
        actor: Option<String>,
        /// Filter by action tag
        #[arg(short, long)]
        action: Option<String>,
        /// Filter by entity type
        #[arg(short, long)]
        entity_type: Option<String>,
        /// Number of results
        #[arg(short, long, default_value = "50")]
        limit: u64,
    },
    /// Export the activity log to a JSON file
    Export {
        /// Output file path
        #[arg(short, long, default_value = "activity_export.json")]
        output: String,
        /// Days of history to export
        #[arg(short, long, default_value = "30")]
        days: i64,
    },
}

/// Activity display row
#[derive(Debug, Tabled)]
struct ActivityRow {
    /// Time
    time: String,
    /// Actor
    actor: String,
    /// Action
    action: String,
    /// Entity
    entity: String,
    /// Field
    field: String,
    /// Old value
    old: String,
    /// New value
    new: String,
}

impl From<&ActivityLogEntry> for ActivityRow {
    fn from(e: &ActivityLogEntry) -> Self {
        Self {
            time: output::timestamp(&e.created_at),
            actor: e.actor_email.clone(),
            action: e.action.clone(),
            entity: format!("{} {}", e.entity_type, output::short_id(&e.entity_id)),
            field: e.field.clone().unwrap_or_default(),
            old: e.old_value.clone().unwrap_or_default(),
            new: e.new_value.clone().unwrap_or_default(),
        }
    }
}

/// Execute audit commands
pub async fn execute(
    args: &AuditArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let logger = ActivityLogger::new(db.stores().activity);

    match &args.command {
        AuditCommand::Search {
            bug,
            actor,
            action,
            entity_type,
            limit,
        } => {
            let filter = ActivityFilter {
                actor_id: super::parse_uuid(actor.as_deref(), "actor")?,
                action: action.clone(),
                entity_type: entity_type.clone(),
                bug_id: super::parse_uuid(bug.as_deref(), "bug")?,
            };
            let page = PageRequest::new(1, *limit);
            let response = logger.search(&filter, &page).await?;

            output::render_page(&response, format, "No matching activity.", |e| ActivityRow::from(e));
        }
        AuditCommand::Export {
            output: out_path,
            days,
        } => {
            let since = chrono::Utc::now() - chrono::Duration::days(*days);
            let entries = logger.export_since(since).await?;

            let json = serde_json::to_string_pretty(&entries)?;
            tokio::fs::write(out_path, json).await?;

            output::print_success(&format!(
                "Exported {} activity entries to '{}'",
                entries.len(),
                out_path
            ));
        }
    }

    Ok(())
}
