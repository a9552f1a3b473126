//! Session lifecycle orchestration.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use harbinger_core::error::AppError;
use harbinger_core::result::AppResult;
use harbinger_database::UserStore;
use harbinger_entity::user::{CreateUser, User};

use crate::jwt::{Claims, IssuedToken, TokenCodec};
use crate::password::PasswordHasher;
use crate::revocation::RevocationStore;

/// Orchestrates login, logout and registration.
#[derive(Debug, Clone)]
pub struct SessionLifecycle {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    codec: Arc<TokenCodec>,
    revocations: Arc<RevocationStore>,
    /// Lower bound on a blacklist entry's lifetime.
    revocation_floor: Duration,
}

impl SessionLifecycle {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        codec: Arc<TokenCodec>,
        revocations: Arc<RevocationStore>,
        revocation_floor: Duration,
    ) -> Self {
        Self {
            users,
            hasher,
            codec,
            revocations,
            revocation_floor,
        }
    }

    /// Authenticate by username or email and issue a token.
    ///
    /// Unknown users and wrong passwords fail identically. No session marker
    /// is written.
    pub async fn login(&self, login: &str, password: &str) -> AppResult<IssuedToken> {
        let Some(user) = self.users.find_by_login(login).await? else {
            self.hasher.verify_dummy(password).await?;
            info!("Login failed: unknown user");
            return Err(AppError::invalid_credentials());
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            info!(user_id = user.id, "Login failed: wrong password");
            return Err(AppError::invalid_credentials());
        }

        let issued = self.codec.issue(user.id, &user.username)?;
        info!(user_id = user.id, username = %user.username, "User logged in");
        Ok(issued)
    }

    /// Revoke `token` and sweep the user's session markers.
    ///
    /// The blacklist write must succeed; the sweep is best effort.
    pub async fn logout(
        &self,
        token: &str,
        claims: &Claims,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let ttl = self.blacklist_ttl(claims, Utc::now());
        self.revocations.blacklist(token, ttl).await?;

        match self
            .revocations
            .purge_sessions_for(claims.user_id, cancel)
            .await
        {
            Ok(outcome) if outcome.completed && outcome.failed == 0 => {}
            Ok(outcome) => warn!(
                user_id = claims.user_id,
                deleted = outcome.deleted,
                failed = outcome.failed,
                completed = outcome.completed,
                "Session purge incomplete"
            ),
            Err(e) => warn!(user_id = claims.user_id, error = %e, "Session purge failed"),
        }

        info!(user_id = claims.user_id, "User logged out");
        Ok(())
    }

    /// Create a user with a freshly hashed password.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> AppResult<User> {
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AppError::validation(
                "Username, email and password are required",
            ));
        }

        let password_hash = self.hasher.hash(password).await?;
        let user = self
            .users
            .create(CreateUser {
                username: username.trim().to_string(),
                email: email.trim().to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// How long a blacklist entry for `claims` must live when written at
    /// `now`: the token's remaining lifetime, never less than the floor.
    pub fn blacklist_ttl(&self, claims: &Claims, now: DateTime<Utc>) -> Duration {
        claims.remaining_at(now).max(self.revocation_floor)
    }
}
