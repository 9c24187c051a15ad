//! Presence registry: every live connection, indexed by user ID.
//!
//! Mutated only by the hub event loop. Routing reads take the shared side of
//! the same lock and get a consistent snapshot of both collections.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::connection::handle::{ConnectionHandle, ConnectionId, ConnectionInfo};

#[derive(Debug, Default)]
struct RegistryState {
    /// Every live connection.
    all: HashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// User ID → the user's current connection. At most one per user.
    by_user: HashMap<String, Arc<ConnectionHandle>>,
}

/// Outcome of removing a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The connection was not registered (already removed).
    NotRegistered,
    /// Removed; `was_current` is true when it was the user's entry in the
    /// per-user index, i.e. the user is now offline.
    Removed {
        /// Whether the per-user entry pointed at this connection.
        was_current: bool,
    },
}

/// Thread-safe registry of live connections.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    inner: RwLock<RegistryState>,
}

impl PresenceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection, overwriting the user's previous entry.
    ///
    /// Returns the displaced connection, if any. It stays in the set of all
    /// connections until its own disconnect is processed.
    pub(crate) fn insert(&self, handle: Arc<ConnectionHandle>) -> Option<Arc<ConnectionHandle>> {
        let mut state = self.inner.write();
        state.all.insert(handle.id, handle.clone());
        state
            .by_user
            .insert(handle.user_id.clone(), handle.clone())
            .filter(|previous| previous.id != handle.id)
    }

    /// Removes a connection.
    ///
    /// The per-user entry is only cleared if it still points at this
    /// connection, so an orphan's removal never evicts its replacement.
    pub(crate) fn remove(&self, handle: &ConnectionHandle) -> Removal {
        let mut state = self.inner.write();
        if state.all.remove(&handle.id).is_none() {
            return Removal::NotRegistered;
        }

        let was_current = state
            .by_user
            .get(&handle.user_id)
            .is_some_and(|current| current.id == handle.id);
        if was_current {
            state.by_user.remove(&handle.user_id);
        }

        Removal::Removed { was_current }
    }

    /// Drains every connection. Used on engine shutdown.
    pub(crate) fn drain(&self) -> Vec<Arc<ConnectionHandle>> {
        let mut state = self.inner.write();
        state.by_user.clear();
        state.all.drain().map(|(_, handle)| handle).collect()
    }

    /// Gets the user's current connection.
    pub fn get(&self, user_id: &str) -> Option<Arc<ConnectionHandle>> {
        self.inner.read().by_user.get(user_id).cloned()
    }

    /// Gets the current connection of each listed user that is online,
    /// skipping `excluded`. Taken under a single read lock.
    pub fn get_many<'a, I>(&self, user_ids: I, excluded: Option<&str>) -> Vec<Arc<ConnectionHandle>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let state = self.inner.read();
        user_ids
            .into_iter()
            .filter(|id| Some(*id) != excluded)
            .filter_map(|id| state.by_user.get(id).cloned())
            .collect()
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.inner.read().all.values().cloned().collect()
    }

    /// Whether the connection is still registered.
    pub fn contains(&self, conn_id: &ConnectionId) -> bool {
        self.inner.read().all.contains_key(conn_id)
    }

    /// Checks if a user is currently online.
    pub fn is_online(&self, user_id: &str) -> bool {
        self.inner.read().by_user.contains_key(user_id)
    }

    /// Snapshot of online user IDs.
    pub fn online_users(&self) -> Vec<String> {
        self.inner.read().by_user.keys().cloned().collect()
    }

    /// Returns total number of live connections, orphans included.
    pub fn connection_count(&self) -> usize {
        self.inner.read().all.len()
    }

    /// Returns number of online users.
    pub fn online_count(&self) -> usize {
        self.inner.read().by_user.len()
    }

    /// Snapshot of every live connection.
    pub fn connection_infos(&self) -> Vec<ConnectionInfo> {
        self.inner.read().all.values().map(|h| h.info()).collect()
    }
}
