//! Route definitions for the Harbinger HTTP API.
//!
//! All routes are mounted under `/api`. Routes that need an identity sit
//! behind the `require_auth` middleware.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the API routes with state attached.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(session_routes())
        .merge(profile_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let api_routes = Router::new()
        .merge(public_routes())
        .merge(health_routes())
        .merge(protected);

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Login and registration
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/users", post(handlers::user::register))
}

/// Logout
fn session_routes() -> Router<AppState> {
    Router::new().route("/auth/logout", post(handlers::auth::logout))
}

/// Own profile
fn profile_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(handlers::user::me))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
