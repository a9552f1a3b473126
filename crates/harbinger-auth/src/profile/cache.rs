//! Cache-aside wrapper around the user store.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use harbinger_cache::CacheManager;
use harbinger_cache::keys;
use harbinger_core::error::AppError;
use harbinger_core::result::AppResult;
use harbinger_core::traits::cache::CacheProvider;
use harbinger_database::UserStore;
use harbinger_entity::user::UserProfile;

/// Serves user profiles from the cache, falling back to the store.
///
/// Cached entries are derived copies that are only invalidated by expiry.
/// Any cache problem degrades to a store read rather than failing the call.
#[derive(Debug, Clone)]
pub struct ProfileCache {
    cache: Arc<CacheManager>,
    users: Arc<dyn UserStore>,
    ttl: Duration,
}

impl ProfileCache {
    pub fn new(cache: Arc<CacheManager>, users: Arc<dyn UserStore>, ttl: Duration) -> Self {
        Self { cache, users, ttl }
    }

    /// Fetch the profile for `user_id`.
    pub async fn get(&self, user_id: i64) -> AppResult<UserProfile> {
        let key = keys::user_profile(user_id);

        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => {
                    debug!(user_id, "Profile cache hit");
                    return Ok(profile);
                }
                Err(e) => warn!(user_id, error = %e, "Discarding unreadable cached profile"),
            },
            Ok(None) => debug!(user_id, "Profile cache miss"),
            Err(e) => warn!(user_id, error = %e, "Profile cache read failed, using store"),
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        let profile = UserProfile::from(user);

        match serde_json::to_string(&profile) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(&key, &raw, self.ttl).await {
                    warn!(user_id, error = %e, "Failed to cache profile");
                }
            }
            Err(e) => warn!(user_id, error = %e, "Failed to serialize profile for cache"),
        }

        Ok(profile)
    }
}
