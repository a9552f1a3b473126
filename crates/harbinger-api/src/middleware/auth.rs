//! Bearer token admission middleware.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Runs the admission gate and stores the resulting
/// [`AuthContext`](harbinger_auth::AuthContext) in the request extensions.
///
/// A header that is not valid UTF-8 counts as absent.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let ctx = state.gate.admit(authorization).await?;
    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}
