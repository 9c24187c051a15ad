//! Request DTOs.

use serde::{Deserialize, Serialize};

/// Query parameters accepted on the WebSocket upgrade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WsQuery {
    /// Bearer token, for clients that cannot set headers on the upgrade.
    pub token: Option<String>,
}
