//! PostgreSQL connection pool and repository wiring.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use bugtrack_core::config::DatabaseConfig;
use bugtrack_core::error::{AppError, ErrorKind};

use crate::repositories::{ActivityLogRepository, BugRepository, DeletedBugRepository};

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

/// The three PostgreSQL-backed stores sharing one pool.
#[derive(Debug, Clone)]
pub struct PgStores {
    /// `bugs` table.
    pub bugs: Arc<BugRepository>,
    /// `deleted_bugs` table.
    pub deleted_bugs: Arc<DeletedBugRepository>,
    /// `activity_logs` table.
    pub activity: Arc<ActivityLogRepository>,
}

impl DatabasePool {
    /// Connect using the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            url = %config.redacted_url(),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Borrow the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Build the repositories for this pool.
    pub fn stores(&self) -> PgStores {
        PgStores {
            bugs: Arc::new(BugRepository::new(self.pool.clone())),
            deleted_bugs: Arc::new(DeletedBugRepository::new(self.pool.clone())),
            activity: Arc::new(ActivityLogRepository::new(self.pool.clone())),
        }
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    /// Close all connections.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
