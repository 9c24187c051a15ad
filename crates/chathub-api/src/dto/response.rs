//! Response DTOs.

use serde::{Deserialize, Serialize};

use chathub_realtime::connection::ConnectionInfo;
use chathub_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Application version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_seconds: i64,
    /// Live WebSocket connections, orphans included.
    pub ws_connections: usize,
    /// Distinct online users.
    pub online_users: usize,
}

/// Online users snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineUsersResponse {
    /// Online user IDs, sorted.
    pub users: Vec<String>,
    /// Number of online users.
    pub count: usize,
}

/// Presence of a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPresenceResponse {
    /// User ID.
    pub user_id: String,
    /// Whether the user has a current connection.
    pub online: bool,
}

/// Hub counters plus live gauges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeMetricsResponse {
    /// Counter snapshot.
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
    /// Registered connections right now.
    pub connections: usize,
    /// Online users right now.
    pub online_users: usize,
}

/// Live connection listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsResponse {
    /// Every registered connection.
    pub connections: Vec<ConnectionInfo>,
}
