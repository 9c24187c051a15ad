//! Route definitions for the ChatHub HTTP API.
//!
//! The WebSocket upgrade lives at `/ws`; presence and diagnostics routes are
//! mounted under `/api`.

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and request logging.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(presence_routes())
        .merge(realtime_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Liveness endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Presence queries
fn presence_routes() -> Router<AppState> {
    Router::new()
        .route("/presence/online", get(handlers::presence::online_users))
        .route("/presence/{user_id}", get(handlers::presence::user_presence))
}

/// Hub diagnostics
fn realtime_routes() -> Router<AppState> {
    Router::new()
        .route("/realtime/metrics", get(handlers::realtime::metrics))
        .route("/realtime/connections", get(handlers::realtime::connections))
}
