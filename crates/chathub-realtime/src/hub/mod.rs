//! The hub: lifecycle event loop plus the routing API.
//!
//! Connect and disconnect are applied one at a time by [`HubLoop`], the only
//! writer of the [`PresenceRegistry`]. Routing calls read the registry under
//! its shared lock from whatever task the caller is on.

mod event_loop;
mod inbound;
mod routing;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use chathub_core::config::RealtimeConfig;
use chathub_core::{AppError, AppResult};

use crate::connection::handle::ConnectionHandle;
use crate::directory::ConversationDirectory;
use crate::metrics::HubMetrics;
use crate::presence::registry::PresenceRegistry;

pub use event_loop::HubLoop;

/// Lifecycle events consumed by the event loop.
#[derive(Debug)]
pub enum HubEvent {
    /// Register a new connection.
    Connect(Arc<ConnectionHandle>),
    /// Remove a connection. Safe to send more than once.
    Disconnect(Arc<ConnectionHandle>),
    /// Acknowledged once every earlier event has been applied.
    Barrier(oneshot::Sender<()>),
    /// Close every connection, registered or still queued, and stop the loop.
    /// Replies with the number of connections closed.
    Shutdown(oneshot::Sender<usize>),
}

/// Shared hub state. Constructed once and passed to every collaborator.
#[derive(Debug)]
pub struct Hub {
    registry: PresenceRegistry,
    events: mpsc::UnboundedSender<HubEvent>,
    directory: Arc<dyn ConversationDirectory>,
    metrics: Arc<HubMetrics>,
    config: RealtimeConfig,
}

impl Hub {
    /// Creates the hub and the event loop that must be spawned to drive it.
    pub fn new(
        config: RealtimeConfig,
        directory: Arc<dyn ConversationDirectory>,
        metrics: Arc<HubMetrics>,
    ) -> (Arc<Self>, HubLoop) {
        let (events, receiver) = mpsc::unbounded_channel();
        let hub = Arc::new(Self {
            registry: PresenceRegistry::new(),
            events,
            directory,
            metrics,
            config,
        });
        let event_loop = HubLoop::new(hub.clone(), receiver);
        (hub, event_loop)
    }

    /// Queues a connect event.
    pub fn connect(&self, handle: Arc<ConnectionHandle>) -> AppResult<()> {
        self.events
            .send(HubEvent::Connect(handle))
            .map_err(|_| AppError::service_unavailable("Hub event loop is not running"))
    }

    /// Queues a disconnect event. Never fails; a stopped loop means the
    /// registry is being discarded anyway.
    pub fn disconnect(&self, handle: Arc<ConnectionHandle>) {
        if self.events.send(HubEvent::Disconnect(handle)).is_err() {
            debug!("Hub event loop stopped, disconnect ignored");
        }
    }

    /// Waits until every event queued before this call has been applied.
    pub async fn barrier(&self) -> AppResult<()> {
        let (tx, rx) = oneshot::channel();
        self.events
            .send(HubEvent::Barrier(tx))
            .map_err(|_| AppError::service_unavailable("Hub event loop is not running"))?;
        rx.await
            .map_err(|_| AppError::service_unavailable("Hub event loop stopped"))
    }

    /// Asks the event loop to close every connection and stop.
    ///
    /// Connect events queued before this call are closed too, so no handle
    /// outlives the hub.
    pub async fn shutdown(&self) -> AppResult<usize> {
        let (tx, rx) = oneshot::channel();
        self.events
            .send(HubEvent::Shutdown(tx))
            .map_err(|_| AppError::service_unavailable("Hub event loop is not running"))?;
        rx.await
            .map_err(|_| AppError::service_unavailable("Hub event loop stopped"))
    }

    /// Creates a connection handle sized by the configured queue capacity.
    pub fn new_connection(
        &self,
        user_id: impl Into<String>,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        ConnectionHandle::new(user_id, self.config.queue_capacity)
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &PresenceRegistry {
        &self.registry
    }

    /// Hub configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Metrics collector.
    pub fn metrics(&self) -> &HubMetrics {
        &self.metrics
    }

    /// Conversation membership collaborator.
    pub fn directory(&self) -> &Arc<dyn ConversationDirectory> {
        &self.directory
    }
}
