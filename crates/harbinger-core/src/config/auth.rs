//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Minimum accepted length of the HMAC signing secret, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365;

/// Token signing and revocation configuration.
///
/// `Debug` is implemented by hand so the signing secret never reaches a log line.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256). Required.
    pub jwt_secret: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
    /// Issuer claim stamped into every token and required on verification.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Minimum blacklist TTL in seconds, applied when a token is at or near expiry.
    #[serde(default = "default_revocation_floor")]
    pub revocation_floor_seconds: u64,
}

impl AuthConfig {
    /// Build an auth configuration with default lifetimes around the given secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_hours: default_token_ttl(),
            issuer: default_issuer(),
            revocation_floor_seconds: default_revocation_floor(),
        }
    }

    /// Reject secrets that are too short to be a real credential and token
    /// lifetimes outside `1..=MAX_TOKEN_TTL_HOURS`.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::configuration(format!(
                "auth.jwt_secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            return Err(AppError::configuration(format!(
                "auth.token_ttl_hours must be between 1 and {MAX_TOKEN_TTL_HOURS}"
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("issuer", &self.issuer)
            .field("revocation_floor_seconds", &self.revocation_floor_seconds)
            .finish()
    }
}

fn default_token_ttl() -> u64 {
    24
}

fn default_issuer() -> String {
    "harbinger".to_string()
}

fn default_revocation_floor() -> u64 {
    300
}
