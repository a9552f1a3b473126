//! PostgreSQL pool for the user store.

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use harbinger_core::config::DatabaseConfig;
use harbinger_core::error::{AppError, ErrorKind};
use harbinger_core::redact::mask_url_password;
use harbinger_core::result::AppResult;

use crate::repositories::user::UserRepository;

/// Schema of the `users` table, embedded at build time.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Connection pool plus the per-query deadline every user lookup runs under.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
    query_timeout: Duration,
}

impl DatabasePool {
    /// Open the pool. Connecting is bounded by `connect_timeout_seconds`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %mask_url_password(&config.url),
            max_connections = config.max_connections,
            query_timeout_ms = config.query_timeout_ms,
            "Opening user store pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreUnavailable, "User store unreachable", e)
            })?;

        Ok(Self {
            pool,
            query_timeout: Duration::from_millis(config.query_timeout_ms),
        })
    }

    /// Bring the `users` schema up to date.
    pub async fn migrate(&self) -> AppResult<()> {
        MIGRATOR.run(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::StoreUnavailable, "User schema migration failed", e)
        })?;
        info!(known = MIGRATOR.migrations.len(), "User schema is current");
        Ok(())
    }

    /// A user repository sharing this pool and its query deadline.
    pub fn user_repository(&self) -> UserRepository {
        UserRepository::new(self.pool.clone(), self.query_timeout)
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("User store pool closed");
    }
}
