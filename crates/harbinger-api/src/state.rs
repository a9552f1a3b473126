//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use harbinger_auth::{
    AuthGate, PasswordHasher, ProfileCache, RevocationStore, SessionLifecycle, TokenCodec,
};
use harbinger_cache::CacheManager;
use harbinger_core::config::AppConfig;
use harbinger_core::result::AppResult;
use harbinger_database::UserStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Cache manager (Redis or in-memory)
    pub cache: Arc<CacheManager>,
    /// Authoritative user store
    pub users: Arc<dyn UserStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// Token signer and verifier
    pub codec: Arc<TokenCodec>,
    /// Blacklist and session markers
    pub revocations: Arc<RevocationStore>,
    /// Per-request admission
    pub gate: Arc<AuthGate>,
    /// Login, logout and registration
    pub sessions: Arc<SessionLifecycle>,
    /// Cache-aside profile reads
    pub profiles: Arc<ProfileCache>,

    // ── Lifecycle ────────────────────────────────────────────
    /// Cancelled on shutdown; stops in-flight session sweeps
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire every component from configuration, a connected cache and a
    /// user store.
    pub fn build(
        config: AppConfig,
        cache: Arc<CacheManager>,
        users: Arc<dyn UserStore>,
    ) -> AppResult<Self> {
        config.auth.validate()?;

        let codec = Arc::new(TokenCodec::new(&config.auth));
        let revocations = Arc::new(RevocationStore::new(
            Arc::clone(&cache),
            config.session.sweep_batch_size,
        ));
        let gate = Arc::new(AuthGate::new(Arc::clone(&codec), Arc::clone(&revocations)));
        let sessions = Arc::new(SessionLifecycle::new(
            Arc::clone(&users),
            PasswordHasher::new()?,
            Arc::clone(&codec),
            Arc::clone(&revocations),
            Duration::from_secs(config.auth.revocation_floor_seconds),
        ));
        let profiles = Arc::new(ProfileCache::new(
            Arc::clone(&cache),
            Arc::clone(&users),
            Duration::from_secs(config.cache.profile_ttl_seconds),
        ));

        Ok(Self {
            config: Arc::new(config),
            cache,
            users,
            codec,
            revocations,
            gate,
            sessions,
            profiles,
            shutdown: CancellationToken::new(),
        })
    }
}
