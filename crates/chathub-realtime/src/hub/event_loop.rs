//! Serialized lifecycle event loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use chathub_core::config::ReconnectPolicy;

use crate::connection::handle::ConnectionHandle;
use crate::message::types::OutboundMessage;
use crate::presence::registry::Removal;

use super::{Hub, HubEvent};

/// Single task that applies connect/disconnect events to the registry.
#[derive(Debug)]
pub struct HubLoop {
    hub: Arc<Hub>,
    events: mpsc::UnboundedReceiver<HubEvent>,
    presence: mpsc::UnboundedSender<OutboundMessage>,
    presence_rx: Option<mpsc::UnboundedReceiver<OutboundMessage>>,
}

impl HubLoop {
    pub(super) fn new(hub: Arc<Hub>, events: mpsc::UnboundedReceiver<HubEvent>) -> Self {
        let (presence, presence_rx) = mpsc::unbounded_channel();
        Self {
            hub,
            events,
            presence,
            presence_rx: Some(presence_rx),
        }
    }

    /// Processes events until a shutdown event arrives or `shutdown` fires.
    ///
    /// Either way every registered connection, and every connection whose
    /// connect event is still queued, ends up closed.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Hub event loop started");

        let fanout = self
            .presence_rx
            .take()
            .map(|rx| tokio::spawn(presence_fanout(self.hub.clone(), rx)));

        let reply = loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break None,
                event = self.events.recv() => match event {
                    Some(event) => event,
                    None => break None,
                },
            };

            match event {
                HubEvent::Connect(handle) => self.on_connect(handle),
                HubEvent::Disconnect(handle) => self.on_disconnect(handle),
                HubEvent::Barrier(ack) => {
                    let _ = ack.send(());
                }
                HubEvent::Shutdown(reply) => break Some(reply),
            }
        };

        let closed = self.teardown();
        if let Some(reply) = reply {
            let _ = reply.send(closed);
        }

        drop(self.presence);
        if let Some(fanout) = fanout {
            let _ = fanout.await;
        }

        info!(count = closed, "Hub event loop stopped");
    }

    fn on_connect(&self, handle: Arc<ConnectionHandle>) {
        if !handle.is_active() {
            debug!(conn_id = %handle.id, "Connection closed before registration");
            return;
        }

        let displaced = self.hub.registry.insert(handle.clone());
        self.hub.metrics.connection_opened();

        if let Some(previous) = displaced {
            match self.hub.config.reconnect_policy {
                ReconnectPolicy::KeepOrphan => {
                    debug!(
                        user_id = %handle.user_id,
                        orphan = %previous.id,
                        "Previous connection replaced and left running"
                    );
                }
                ReconnectPolicy::ClosePrevious => {
                    info!(
                        user_id = %handle.user_id,
                        previous = %previous.id,
                        "Closing previous connection for reconnecting user"
                    );
                    previous.begin_close();
                }
            }
        }

        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            "WebSocket connection registered"
        );

        self.announce(OutboundMessage::UserOnline {
            user_id: handle.user_id.clone(),
        });
    }

    fn on_disconnect(&self, handle: Arc<ConnectionHandle>) {
        let was_current = match self.hub.registry.remove(&handle) {
            Removal::NotRegistered => {
                debug!(conn_id = %handle.id, "Disconnect for unregistered connection ignored");
                return;
            }
            Removal::Removed { was_current } => was_current,
        };

        handle.mark_closed();
        self.hub.metrics.connection_closed();

        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            "WebSocket connection unregistered"
        );

        // An orphan going away does not change the user's presence.
        if was_current {
            self.announce(OutboundMessage::UserOffline {
                user_id: handle.user_id.clone(),
            });
        }
    }

    /// Closes everything the hub knows about and stops accepting events.
    fn teardown(&mut self) -> usize {
        let registered = self.hub.registry.drain();
        for handle in &registered {
            handle.mark_closed();
            self.hub.metrics.connection_closed();
        }

        // Senders fail from here on; whatever is already buffered is drained.
        self.events.close();
        let mut pending = 0;
        while let Ok(event) = self.events.try_recv() {
            match event {
                HubEvent::Connect(handle) => {
                    handle.mark_closed();
                    pending += 1;
                }
                HubEvent::Disconnect(_) => {}
                HubEvent::Barrier(ack) => {
                    let _ = ack.send(());
                }
                HubEvent::Shutdown(reply) => {
                    let _ = reply.send(0);
                }
            }
        }

        debug!(registered = registered.len(), pending, "Hub connections closed");
        registered.len() + pending
    }

    /// Hands a presence event to the fan-out task; never blocks the loop.
    fn announce(&self, message: OutboundMessage) {
        self.hub.metrics.presence_broadcast();
        if self.presence.send(message).is_err() {
            debug!("Presence fan-out stopped, event dropped");
        }
    }
}

/// Broadcasts presence events one after another, in the order the loop
/// produced them.
async fn presence_fanout(hub: Arc<Hub>, mut rx: mpsc::UnboundedReceiver<OutboundMessage>) {
    while let Some(message) = rx.recv().await {
        hub.broadcast_all(&message);
    }
}
