//! Health check handler.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use harbinger_core::result::AppResult;
use harbinger_core::traits::cache::CacheProvider;
use harbinger_database::UserStore;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// Always answers; a failing backend is reported in the body.
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let (cache, database) = tokio::join!(state.cache.health_check(), state.users.health_check());

    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: describe("cache", cache).to_string(),
        database: describe("database", database).to_string(),
    }))
}

fn describe(backend: &'static str, check: AppResult<bool>) -> &'static str {
    match check {
        Ok(true) => "connected",
        Ok(false) => "degraded",
        Err(e) => {
            warn!(backend, error = %e, "Health check failed");
            "unavailable"
        }
    }
}
