//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use chathub_core::config::AppConfig;
use chathub_realtime::server::RealtimeEngine;

use crate::auth::ConnectionAuthenticator;

/// Application state passed to every Axum handler via `State<AppState>`.
///
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Real-time engine (hub, event loop, metrics)
    pub realtime: RealtimeEngine,
    /// Validates upgrade and API tokens
    pub authenticator: Arc<dyn ConnectionAuthenticator>,
    /// Process start time, for uptime reporting
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(
        config: Arc<AppConfig>,
        realtime: RealtimeEngine,
        authenticator: Arc<dyn ConnectionAuthenticator>,
    ) -> Self {
        Self {
            config,
            realtime,
            authenticator,
            started_at: Utc::now(),
        }
    }
}
