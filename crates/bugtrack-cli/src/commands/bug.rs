//! Bug administration commands.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use bugtrack_core::error::AppError;
use bugtrack_core::traits::StaticSession;
use bugtrack_core::types::actor::{Actor, ActorRole};
use bugtrack_database::BugStore;
use bugtrack_service::{
    ActivityLogger, DeletionOrchestrator, InFlightRegistry, RequestContext,
};
use bugtrack_storage::{BugImageGateway, open_bug_image_store};

/// Arguments for bug commands
#[derive(Debug, Args)]
pub struct BugArgs {
    /// Bug subcommand
    #[command(subcommand)]
    pub command: BugCommand,
}

/// Bug subcommands
#[derive(Debug, Subcommand)]
pub enum BugCommand {
    /// Delete a bug with snapshot, audit row, and image cleanup
    Delete {
        /// Bug ID
        id: String,
        /// Acting user ID
        #[arg(long)]
        actor: String,
        /// Acting user email (recorded in the activity log)
        #[arg(long)]
        email: String,
        /// Act with admin rights
        #[arg(long)]
        admin: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the activity history of a bug
    History {
        /// Bug ID
        id: String,
    },
}

/// History display row
#[derive(Debug, Tabled)]
struct HistoryRow {
    /// Time
    time: String,
    /// Actor
    actor: String,
    /// Action
    action: String,
    /// Change
    change: String,
}

/// Execute bug commands
pub async fn execute(
    args: &BugArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let stores = db.stores();
    let logger = Arc::new(ActivityLogger::new(stores.activity.clone()));

    match &args.command {
        BugCommand::Delete {
            id,
            actor,
            email,
            admin,
            yes,
        } => {
            let bug_id = parse_required(id, "bug")?;
            let role = if *admin {
                ActorRole::Admin
            } else {
                ActorRole::Member
            };
            let actor = Actor::new(parse_required(actor, "actor")?, email.clone(), role);

            let bug = stores
                .bugs
                .find_by_id(bug_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Bug {bug_id} not found")))?;

            output::print_kv("Title", &bug.title);
            output::print_kv("Owner", &bug.owner_id.to_string());
            output::print_kv("Status", bug.status.as_str());

            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt("Permanently delete this bug and its images?")
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let store = open_bug_image_store(&config.storage).await?;
            let session = Arc::new(StaticSession::signed_in(actor.clone()));
            let images = Arc::new(BugImageGateway::new(store, session, &config.storage)?);
            let registry = Arc::new(InFlightRegistry::new(Duration::from_secs(
                config.deletion.in_flight_stall_seconds,
            )));
            let orchestrator = DeletionOrchestrator::new(
                stores.bugs.clone(),
                stores.deleted_bugs.clone(),
                logger,
                images,
                registry,
            );

            let result = orchestrator
                .delete_bug(Some(&bug), &RequestContext::new(actor))
                .await;
            if format == OutputFormat::Json {
                output::print_json(&result);
            }

            if let Some(error) = result.error {
                return Err(AppError::internal(error.to_string()));
            }
            if let Some(warning) = &result.cleanup_warning {
                output::print_warning(&warning.to_string());
            }
            output::print_success(&format!("Deleted bug {bug_id}"));
        }
        BugCommand::History { id } => {
            let bug_id = parse_required(id, "bug")?;
            let history = logger.history(bug_id).await?;

            output::render(&history, format, "No activity recorded.", |e| HistoryRow {
                time: output::timestamp(&e.created_at),
                actor: e.actor_email.clone(),
                action: e.action.clone(),
                change: match (&e.field, &e.old_value, &e.new_value) {
                    (Some(f), Some(o), Some(n)) => format!("{f}: {o} -> {n}"),
                    (_, _, Some(n)) => n.clone(),
                    _ => String::new(),
                },
            });
        }
    }

    db.close().await;
    Ok(())
}

fn parse_required(value: &str, what: &str) -> Result<uuid::Uuid, AppError> {
    uuid::Uuid::parse_str(value)
        .map_err(|e| AppError::validation(format!("Invalid {what} UUID: {e}")))
}
