//! `AuthUser` extractor: the identity admitted by `require_auth`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use harbinger_auth::AuthContext;
use harbinger_core::error::AppError;

use crate::error::ApiError;

/// Authenticated user context available in handlers.
///
/// Only resolves on routes behind the auth middleware; anywhere else it
/// rejects as if no token had been sent.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

impl std::ops::Deref for AuthUser {
    type Target = AuthContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::missing_token("Authentication required").into())
    }
}
