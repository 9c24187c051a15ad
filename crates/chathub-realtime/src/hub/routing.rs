//! Routing API: how collaborators reach connected users.
//!
//! Every call serializes the message once, snapshots its targets under the
//! registry's read lock, and enqueues without waiting. Offline targets are
//! skipped silently.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, warn};

use crate::connection::handle::{ConnectionHandle, ConnectionInfo, EnqueueError};
use crate::message::serializer::encode_outbound;

use super::Hub;

impl Hub {
    /// Sends to one user's current connection. No-op if the user is offline.
    pub fn send_to_user<M: Serialize + ?Sized>(&self, user_id: &str, message: &M) {
        let Some(payload) = encode(message) else {
            return;
        };
        if let Some(handle) = self.registry.get(user_id) {
            self.deliver_all(&[handle], payload);
        }
    }

    /// Sends to each listed user that is online.
    pub fn send_to_users<M, S>(&self, user_ids: &[S], message: &M)
    where
        M: Serialize + ?Sized,
        S: AsRef<str>,
    {
        self.send_excluding(user_ids, None, message);
    }

    /// Sends to every participant except the sender.
    pub fn send_to_conversation_excluding_sender<M, S>(
        &self,
        participants: &[S],
        sender_id: &str,
        message: &M,
    ) where
        M: Serialize + ?Sized,
        S: AsRef<str>,
    {
        self.send_excluding(participants, Some(sender_id), message);
    }

    /// Sends to every session participant except `excluded`, when given.
    pub fn send_to_session_excluding<M, S>(
        &self,
        participants: &[S],
        excluded: Option<&str>,
        message: &M,
    ) where
        M: Serialize + ?Sized,
        S: AsRef<str>,
    {
        self.send_excluding(participants, excluded, message);
    }

    /// Sends to every live connection, orphans included.
    pub fn broadcast_all<M: Serialize + ?Sized>(&self, message: &M) {
        let Some(payload) = encode(message) else {
            return;
        };
        let targets = self.registry.all_connections();
        self.deliver_all(&targets, payload);
    }

    /// Checks if a user is currently online.
    pub fn is_online(&self, user_id: &str) -> bool {
        self.registry.is_online(user_id)
    }

    /// Snapshot of online user IDs, for presence queries.
    pub fn list_online(&self) -> Vec<String> {
        self.registry.online_users()
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    /// Returns the number of online users.
    pub fn online_count(&self) -> usize {
        self.registry.online_count()
    }

    /// Snapshot of every live connection.
    pub fn connections(&self) -> Vec<ConnectionInfo> {
        self.registry.connection_infos()
    }

    fn send_excluding<M, S>(&self, user_ids: &[S], excluded: Option<&str>, message: &M)
    where
        M: Serialize + ?Sized,
        S: AsRef<str>,
    {
        let Some(payload) = encode(message) else {
            return;
        };
        let targets = self
            .registry
            .get_many(user_ids.iter().map(AsRef::as_ref), excluded);
        self.deliver_all(&targets, payload);
    }

    fn deliver_all(&self, targets: &[Arc<ConnectionHandle>], payload: String) {
        let mut sent = 0u64;
        for handle in targets {
            if self.deliver(handle, payload.clone()) {
                sent += 1;
            }
        }
        self.metrics.message_sent_count(sent);
    }

    /// Non-blocking enqueue. A full queue tears the connection down.
    fn deliver(&self, handle: &Arc<ConnectionHandle>, payload: String) -> bool {
        match handle.try_enqueue(payload) {
            Ok(()) => true,
            Err(EnqueueError::Full) => {
                if handle.begin_close() {
                    warn!(
                        conn_id = %handle.id,
                        user_id = %handle.user_id,
                        "Outbound queue full, disconnecting slow connection"
                    );
                    self.metrics.backpressure_disconnect();
                    self.disconnect(handle.clone());
                }
                false
            }
            Err(EnqueueError::Closed) => false,
        }
    }
}

fn encode<M: Serialize + ?Sized>(message: &M) -> Option<String> {
    match encode_outbound(message) {
        Ok(payload) => Some(payload),
        Err(e) => {
            error!(error = %e, "Failed to serialize outbound message");
            None
        }
    }
}
