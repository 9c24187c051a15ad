//! Real-time diagnostics handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, ConnectionsResponse, RealtimeMetricsResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/realtime/metrics
pub async fn metrics(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<ApiResponse<RealtimeMetricsResponse>> {
    let hub = &state.realtime.hub;

    Json(ApiResponse::ok(RealtimeMetricsResponse {
        counters: state.realtime.metrics.snapshot(),
        connections: hub.connection_count(),
        online_users: hub.online_count(),
    }))
}

/// GET /api/realtime/connections
pub async fn connections(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<ApiResponse<ConnectionsResponse>> {
    let mut connections = state.realtime.hub.connections();
    connections.sort_by_key(|c| c.connected_at);

    Json(ApiResponse::ok(ConnectionsResponse { connections }))
}
