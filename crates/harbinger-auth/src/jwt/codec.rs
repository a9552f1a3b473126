//! HS256 token issuance and verification.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use harbinger_core::config::AuthConfig;
use harbinger_core::error::{AppError, ErrorKind};
use harbinger_core::result::AppResult;

use super::claims::Claims;

/// A freshly signed token and its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Compact JWT string.
    pub token: String,
    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies compact tokens with a symmetric secret.
///
/// The secret is bound once at construction; the codec holds no other state
/// and is cheap to share behind an `Arc`.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    lifetime: chrono::Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            lifetime: lifetime_from_hours(config.token_ttl_hours),
        }
    }

    /// Issues a token with the configured lifetime.
    pub fn issue(&self, user_id: i64, username: &str) -> AppResult<IssuedToken> {
        self.issue_with_lifetime(user_id, username, self.lifetime)
    }

    /// Issues a token valid for `lifetime` from now. A negative lifetime
    /// yields a token that is already expired.
    pub fn issue_with_lifetime(
        &self,
        user_id: i64,
        username: &str,
        lifetime: chrono::Duration,
    ) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| AppError::configuration("Token lifetime is out of range"))?;

        let claims = Claims {
            user_id,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to sign token", e))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies structure, signature, issuer and expiry.
    ///
    /// Revocation state is not consulted here.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(token, e))?;

        // `exp == now` is already expired; the library only rejects `exp < now`.
        if data.claims.is_expired_at(Utc::now()) {
            return Err(AppError::expired("Token has expired"));
        }

        Ok(data.claims)
    }
}

/// Hours that do not fit a `TimeDelta` saturate; issuing then fails instead
/// of overflowing.
fn lifetime_from_hours(hours: u64) -> TimeDelta {
    i64::try_from(hours)
        .ok()
        .and_then(TimeDelta::try_hours)
        .unwrap_or(TimeDelta::MAX)
}

fn classify(token: &str, e: jsonwebtoken::errors::Error) -> AppError {
    match e.kind() {
        JwtErrorKind::ExpiredSignature => {
            AppError::with_source(ErrorKind::Expired, "Token has expired", e)
        }
        JwtErrorKind::InvalidSignature => {
            AppError::with_source(ErrorKind::SignatureInvalid, "Invalid token signature", e)
        }
        JwtErrorKind::Base64(_) if has_readable_header_and_payload(token) => {
            AppError::with_source(ErrorKind::SignatureInvalid, "Invalid token signature", e)
        }
        _ => AppError::with_source(ErrorKind::Malformed, "Malformed token", e),
    }
}

/// A corrupted signature segment surfaces as a base64 error before the HMAC
/// comparison runs. When the other two segments decode cleanly the token is
/// well-formed and only its signature is bad.
fn has_readable_header_and_payload(token: &str) -> bool {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(_), None) => {
            URL_SAFE_NO_PAD.decode(header).is_ok() && URL_SAFE_NO_PAD.decode(payload).is_ok()
        }
        _ => false,
    }
}
