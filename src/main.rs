//! Bugtrack reconciler
//!
//! Periodically sweeps recent deleted-bug snapshots and reports those whose
//! bug still exists, i.e. deletes that stopped between the audit steps and
//! the relational delete. Findings are logged; nothing is modified.

use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use bugtrack_core::config::{AppConfig, LogFormat};
use bugtrack_core::error::AppError;
use bugtrack_database::DatabasePool;
use bugtrack_service::SnapshotReconciler;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Reconciler error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("BUGTRACK_ENV").unwrap_or_else(|_| "development".to_string());
    match std::env::var("BUGTRACK_CONFIG") {
        Ok(path) => AppConfig::load_from(&[path, format!("config/{env}")]),
        Err(_) => AppConfig::load(&env),
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured filter.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.directive()));
    let builder = fmt().with_env_filter(filter).with_target(true);

    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Bugtrack reconciler v{}", env!("CARGO_PKG_VERSION"));

    let db = DatabasePool::connect(&config.database).await?;
    bugtrack_database::migration::run_migrations(db.pool()).await?;

    let stores = db.stores();
    let reconciler = SnapshotReconciler::new(stores.bugs, stores.deleted_bugs);
    let lookback = chrono::Duration::hours(config.deletion.reconcile_lookback_hours);
    let period = Duration::from_secs(config.deletion.reconcile_interval_seconds.max(1));

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tracing::info!(
        interval_seconds = period.as_secs(),
        lookback_hours = config.deletion.reconcile_lookback_hours,
        "Reconciler running"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // A failed sweep is retried on the next tick.
                if let Err(e) = reconciler.run(lookback).await {
                    tracing::error!(error = %e, "Reconciliation sweep failed");
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }

    db.close().await;
    tracing::info!("Reconciler stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
