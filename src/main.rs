//! Harbinger Server
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use harbinger_api::AppState;
use harbinger_cache::CacheManager;
use harbinger_core::config::AppConfig;
use harbinger_database::{DatabasePool, MemoryUserStore, UserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("HARBINGER_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("Failed to load configuration")?;

    init_logging(&config);
    tracing::info!(env = %env, "Starting Harbinger v{}", env!("CARGO_PKG_VERSION"));

    run(config).await
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    // ── Step 1: Cache ────────────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = Arc::new(
        CacheManager::new(&config.cache)
            .await
            .context("Cache initialization failed")?,
    );

    // ── Step 2: User store ───────────────────────────────────────
    let mut db_pool = None;
    let users: Arc<dyn UserStore> = if config.database.is_memory() {
        tracing::warn!("Using in-memory user store; users are lost on restart");
        Arc::new(MemoryUserStore::new())
    } else {
        let pool = DatabasePool::connect(&config.database)
            .await
            .context("Database connection failed")?;
        pool.migrate().await.context("Database migrations failed")?;
        let repo = pool.user_repository();
        db_pool = Some(pool);
        Arc::new(repo)
    };

    // ── Step 3: State + server ───────────────────────────────────
    let state = AppState::build(config, cache, users).context("Failed to build state")?;
    harbinger_api::app::serve(state, shutdown_signal())
        .await
        .context("Server error")?;

    // ── Step 4: Cleanup ──────────────────────────────────────────
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
