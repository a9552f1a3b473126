//! Server-side revocation state kept in the shared cache.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use harbinger_cache::CacheManager;
use harbinger_cache::keys;
use harbinger_core::result::AppResult;
use harbinger_core::traits::cache::CacheProvider;

use super::sweep::SessionSweep;

/// Value written under each advisory session marker.
const SESSION_MARKER_VALUE: &str = "active";

/// Result of a session purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Markers deleted.
    pub deleted: u64,
    /// Markers whose delete failed and were left in place.
    pub failed: u64,
    /// `false` if the purge was cancelled before the scan finished.
    pub completed: bool,
}

/// Blacklist of logged-out tokens plus the per-user session markers.
///
/// A single shared cache instance is authoritative; correctness relies only
/// on its single-key atomicity.
#[derive(Debug, Clone)]
pub struct RevocationStore {
    cache: Arc<CacheManager>,
    sweep_batch_size: usize,
}

impl RevocationStore {
    pub fn new(cache: Arc<CacheManager>, sweep_batch_size: usize) -> Self {
        Self {
            cache,
            sweep_batch_size,
        }
    }

    /// Blacklist `token` for `ttl`. Setting it again only refreshes the expiry.
    pub async fn blacklist(&self, token: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .set(&keys::blacklisted_token(token), keys::BLACKLIST_MARKER, ttl)
            .await?;
        debug!(ttl_secs = ttl.as_secs(), "Token blacklisted");
        Ok(())
    }

    /// Whether `token` is blacklisted. Store errors are returned, never
    /// treated as "not blacklisted".
    pub async fn is_blacklisted(&self, token: &str) -> AppResult<bool> {
        self.cache.exists(&keys::blacklisted_token(token)).await
    }

    /// Write an advisory session marker for `user_id`.
    pub async fn record_session(
        &self,
        user_id: i64,
        session_id: &str,
        ttl: Duration,
    ) -> AppResult<()> {
        self.cache
            .set(
                &keys::session_marker(user_id, session_id),
                SESSION_MARKER_VALUE,
                ttl,
            )
            .await
    }

    /// Start a lazy sweep over the session markers of `user_id`.
    pub fn sweep_sessions(&self, user_id: i64) -> SessionSweep {
        SessionSweep::new(Arc::clone(&self.cache), user_id, self.sweep_batch_size)
    }

    /// Delete every session marker of `user_id`.
    ///
    /// Cancellation is checked between round trips and yields an outcome with
    /// `completed == false`. A failed scan round trip is returned as an
    /// error; markers deleted before it stay deleted. A failed delete is
    /// counted and skipped.
    pub async fn purge_sessions_for(
        &self,
        user_id: i64,
        cancel: &CancellationToken,
    ) -> AppResult<PurgeOutcome> {
        let mut sweep = self.sweep_sessions(user_id);
        let mut outcome = PurgeOutcome::default();

        loop {
            let batch = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(user_id, deleted = outcome.deleted, "Session purge cancelled");
                    return Ok(outcome);
                }
                batch = sweep.next_batch() => batch?,
            };

            let Some(keys) = batch else {
                break;
            };

            for key in keys {
                if cancel.is_cancelled() {
                    info!(user_id, deleted = outcome.deleted, "Session purge cancelled");
                    return Ok(outcome);
                }
                match self.cache.delete(&key).await {
                    Ok(()) => outcome.deleted += 1,
                    Err(e) => {
                        warn!(user_id, error = %e, "Failed to delete session marker");
                        outcome.failed += 1;
                    }
                }
            }
        }

        outcome.completed = true;
        debug!(
            user_id,
            deleted = outcome.deleted,
            failed = outcome.failed,
            "Session purge finished"
        );
        Ok(outcome)
    }
}
