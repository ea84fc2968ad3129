//! Snapshot reconciliation command.

use clap::Args;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use bugtrack_core::error::AppError;
use bugtrack_service::SnapshotReconciler;

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Hours of snapshots to examine (defaults to the configured lookback)
    #[arg(long)]
    pub hours: Option<i64>,
}

/// Finding display row
#[derive(Debug, Tabled)]
struct FindingRow {
    /// Attempted at
    deleted_at: String,
    /// Bug
    bug: String,
    /// Title
    title: String,
    /// Attempted by
    deleted_by: String,
}

/// Execute the reconcile command
pub async fn execute(
    args: &ReconcileArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let stores = db.stores();
    let reconciler = SnapshotReconciler::new(stores.bugs, stores.deleted_bugs);

    let hours = args.hours.unwrap_or(config.deletion.reconcile_lookback_hours);
    let report = reconciler.run(chrono::Duration::hours(hours)).await?;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table if report.is_clean() => output::print_success(&format!(
            "{} snapshots in the last {hours}h all match completed deletes",
            report.scanned
        )),
        OutputFormat::Table => {
            output::render(&report.orphaned, format, "", |f| FindingRow {
                deleted_at: output::timestamp(&f.deleted_at),
                bug: f.original_bug_id.to_string(),
                title: f.title.clone(),
                deleted_by: output::short_id(&f.deleted_by),
            });
            output::print_warning(&format!(
                "{} of {} snapshots refer to bugs that still exist",
                report.orphaned.len(),
                report.scanned
            ));
        }
    }

    db.close().await;
    Ok(())
}
