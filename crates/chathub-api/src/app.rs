//! Application builder: wires router, middleware and state into an Axum app
//! and runs it until shutdown.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

use chathub_core::config::AppConfig;
use chathub_core::error::AppError;
use chathub_realtime::directory::ConversationDirectory;
use chathub_realtime::server::RealtimeEngine;

use crate::auth::JwtAuthenticator;
use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the ChatHub server until `shutdown` resolves, then closes every
/// live connection.
pub async fn run_server<F>(
    config: AppConfig,
    directory: Arc<dyn ConversationDirectory>,
    shutdown: F,
) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = config.server.bind_address();
    tracing::info!(address = %address, "Starting ChatHub server");

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let engine = RealtimeEngine::start(config.realtime.clone(), directory);
    let authenticator = Arc::new(JwtAuthenticator::new(&config.auth));
    let state = AppState::new(Arc::new(config), engine.clone(), authenticator);
    let app = build_app(state);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {address}: {e}")))?;

    let (stopped_tx, stopped_rx) = oneshot::channel::<()>();
    let signal_engine = engine.clone();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received");
                // Live WebSockets would otherwise hold the graceful drain open.
                if let Err(e) = signal_engine.shutdown().await {
                    tracing::warn!(error = %e, "Real-time engine shutdown failed");
                }
                let _ = stopped_tx.send(());
            })
            .into_future(),
    );

    let result = tokio::select! {
        joined = &mut server => joined,
        _ = async {
            if stopped_rx.await.is_ok() {
                tokio::time::sleep(grace).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
            server.abort();
            return Ok(());
        }
    };

    result
        .map_err(|e| AppError::internal(format!("Server task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;
    tracing::info!("ChatHub server stopped");
    Ok(())
}
