//! Presence query handlers.

use axum::Json;
use axum::extract::{Path, State};

use crate::dto::response::{ApiResponse, OnlineUsersResponse, UserPresenceResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/presence/online
pub async fn online_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<ApiResponse<OnlineUsersResponse>> {
    let mut users = state.realtime.hub.list_online();
    users.sort();

    Json(ApiResponse::ok(OnlineUsersResponse {
        count: users.len(),
        users,
    }))
}

/// GET /api/presence/{user_id}
pub async fn user_presence(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> Json<ApiResponse<UserPresenceResponse>> {
    let online = state.realtime.hub.is_online(&user_id);
    Json(ApiResponse::ok(UserPresenceResponse { user_id, online }))
}
