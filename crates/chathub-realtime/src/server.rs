//! Top-level real-time engine that owns the hub and its event loop.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Sink, Stream};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use chathub_core::config::RealtimeConfig;
use chathub_core::error::AppError;

use crate::connection::frame::Frame;
use crate::connection::session;
use crate::directory::ConversationDirectory;
use crate::hub::Hub;
use crate::metrics::HubMetrics;

/// Central real-time engine. Construct once at startup and share.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Presence registry and routing API.
    pub hub: Arc<Hub>,
    /// Metrics collector.
    pub metrics: Arc<HubMetrics>,
    shutdown: CancellationToken,
    event_loop: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.hub.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates the engine and spawns the hub event loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: RealtimeConfig, directory: Arc<dyn ConversationDirectory>) -> Self {
        let metrics = Arc::new(HubMetrics::new());
        let (hub, event_loop) = Hub::new(config, directory, metrics.clone());
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(event_loop.run(shutdown.clone()));

        info!("Real-time engine initialized");

        Self {
            hub,
            metrics,
            shutdown,
            event_loop: Arc::new(Mutex::new(Some(task))),
        }
    }

    /// Serves an authenticated connection until it closes.
    pub async fn accept<S, K, E>(&self, user_id: impl Into<String>, stream: S, sink: K)
    where
        S: Stream<Item = Result<Frame, E>> + Unpin,
        E: Display,
        K: Sink<Frame> + Unpin + Send + 'static,
        K::Error: Display,
    {
        let (handle, queue) = self.hub.new_connection(user_id);
        session::serve(self.hub.clone(), handle, queue, stream, sink).await;
    }

    /// Returns a token cancelled when the engine shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Closes every connection and stops the event loop.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down real-time engine");

        // The loop closes registered and still-queued connections itself.
        // An error means it already stopped and tore everything down.
        let closed = match self.hub.shutdown().await {
            Ok(closed) => closed,
            Err(e) => {
                debug!(error = %e, "Hub event loop already stopped");
                0
            }
        };
        self.shutdown.cancel();

        let task = self.event_loop.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Hub event loop ended abnormally");
                return Err(AppError::internal(format!("Hub event loop failed: {e}")));
            }
        }

        info!(count = closed, "Real-time engine shut down");
        Ok(())
    }
}
