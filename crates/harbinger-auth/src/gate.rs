//! Per-request admission decision.

use std::sync::Arc;

use tracing::warn;

use harbinger_core::error::{AppError, ErrorKind};
use harbinger_core::result::AppResult;

use crate::jwt::{Claims, TokenCodec};
use crate::revocation::RevocationStore;

/// Verified identity attached to an admitted request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The raw bearer token, needed to blacklist it on logout.
    pub token: String,
    /// Verified claims.
    pub claims: Claims,
}

impl AuthContext {
    pub fn user_id(&self) -> i64 {
        self.claims.user_id
    }

    pub fn username(&self) -> &str {
        &self.claims.username
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly two whitespace-separated parts, the first being
/// `bearer` in any case.
pub fn bearer_token(header: Option<&str>) -> AppResult<&str> {
    let header = header.ok_or_else(|| AppError::missing_token("Missing authorization header"))?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AppError::missing_token(
            "Authorization header must be 'Bearer <token>'",
        )),
    }
}

/// Admits or rejects requests by their bearer token.
///
/// Holds no per-request state and is safe to call concurrently.
#[derive(Debug, Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    revocations: Arc<RevocationStore>,
}

impl AuthGate {
    pub fn new(codec: Arc<TokenCodec>, revocations: Arc<RevocationStore>) -> Self {
        Self { codec, revocations }
    }

    /// Decide whether a request carrying `authorization` is admitted.
    ///
    /// A blacklist lookup that fails rejects the request.
    pub async fn admit(&self, authorization: Option<&str>) -> AppResult<AuthContext> {
        let token = bearer_token(authorization)?;

        let claims = self.codec.verify(token).inspect_err(|e| {
            if e.kind == ErrorKind::SignatureInvalid {
                warn!(error = %e, "Rejected token with invalid signature");
            }
        })?;

        if self.revocations.is_blacklisted(token).await.inspect_err(|e| {
            warn!(user_id = claims.user_id, error = %e, "Blacklist lookup failed, rejecting");
        })? {
            return Err(AppError::revoked("Token has been revoked"));
        }

        Ok(AuthContext {
            token: token.to_string(),
            claims,
        })
    }
}
