//! # chathub-api
//!
//! HTTP layer for ChatHub built on Axum.
//!
//! Provides the authenticated WebSocket upgrade, presence and diagnostics
//! endpoints, middleware (CORS, request logging) and error mapping.

pub mod app;
pub mod auth;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use auth::{AuthenticatedUser, Claims, ConnectionAuthenticator, JwtAuthenticator};
pub use router::build_router;
pub use state::AppState;
