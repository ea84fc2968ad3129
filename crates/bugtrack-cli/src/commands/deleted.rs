//! Deleted bug snapshot commands.

use clap::{Args, Subcommand};
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use bugtrack_core::error::AppError;
use bugtrack_core::types::pagination::PageRequest;
use bugtrack_database::DeletedBugStore;
use bugtrack_entity::deleted::DeletedBugSnapshot;

/// Arguments for deleted-bug commands
#[derive(Debug, Args)]
pub struct DeletedArgs {
    /// Deleted subcommand
    #[command(subcommand)]
    pub command: DeletedCommand,
}

/// Deleted-bug subcommands
#[derive(Debug, Subcommand)]
pub enum DeletedCommand {
    /// List snapshots, newest first
    List {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u64,
        /// Page size
        #[arg(short, long, default_value = "25")]
        limit: u64,
    },
    /// Show every snapshot taken for one bug
    Show {
        /// Original bug ID
        bug_id: String,
    },
}

/// Snapshot display row
#[derive(Debug, Tabled)]
struct SnapshotRow {
    /// Deleted at
    deleted_at: String,
    /// Original bug
    bug: String,
    /// Title
    title: String,
    /// Status
    status: String,
    /// Owner
    owner: String,
    /// Deleted by
    deleted_by: String,
    /// Admin delete
    admin: bool,
}

impl From<&DeletedBugSnapshot> for SnapshotRow {
    fn from(s: &DeletedBugSnapshot) -> Self {
        Self {
            deleted_at: output::timestamp(&s.deleted_at),
            bug: output::short_id(&s.original_bug_id),
            title: s.title.clone(),
            status: s.status.to_string(),
            owner: output::short_id(&s.owner_id),
            deleted_by: output::short_id(&s.deleted_by),
            admin: s.metadata["deleted_by_admin"].as_bool().unwrap_or(false),
        }
    }
}

/// Execute deleted-bug commands
pub async fn execute(
    args: &DeletedArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let snapshots = db.stores().deleted_bugs;

    match &args.command {
        DeletedCommand::List { page, limit } => {
            let response = snapshots.list(&PageRequest::new(*page, *limit)).await?;
            output::render_page(&response, format, "No deleted bugs.", |s| SnapshotRow::from(s));
        }
        DeletedCommand::Show { bug_id } => {
            let bug_id = uuid::Uuid::parse_str(bug_id)
                .map_err(|e| AppError::validation(format!("Invalid bug UUID: {e}")))?;
            let items = snapshots.find_by_original_id(bug_id).await?;
            output::render(
                &items,
                format,
                &format!("No snapshot recorded for bug {bug_id}."),
                |s| SnapshotRow::from(s),
            );
        }
    }

    db.close().await;
    Ok(())
}
