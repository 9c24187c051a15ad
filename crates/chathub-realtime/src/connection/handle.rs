//! Individual WebSocket connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Lifecycle of a connection. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Both loops running, queue accepting payloads.
    Active,
    /// Teardown requested; the queue no longer accepts payloads.
    Closing,
    /// Removed from the registry. Terminal.
    Closed,
}

impl ConnectionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Active,
            1 => Self::Closing,
            _ => Self::Closed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Closing => 1,
            Self::Closed => 2,
        }
    }
}

/// Why a payload could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
    /// The outbound queue is at capacity.
    #[error("outbound queue full")]
    Full,
    /// The connection is closing or closed.
    #[error("connection closed")]
    Closed,
}

/// A handle to a single WebSocket connection.
///
/// Holds the producer side of the bounded outbound queue plus the identity
/// the connection was authenticated as. The consumer side is owned by the
/// write loop.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Server-assigned user identity
    pub user_id: String,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<String>,
    state: AtomicU8,
    shutdown: CancellationToken,
}

impl ConnectionHandle {
    /// Creates a handle with an outbound queue of `capacity` slots.
    ///
    /// Returns the handle and the receiving end of its queue.
    pub fn new(user_id: impl Into<String>, capacity: usize) -> (Arc<Self>, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let handle = Arc::new(Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            connected_at: Utc::now(),
            sender,
            state: AtomicU8::new(ConnectionState::Active.as_u8()),
            shutdown: CancellationToken::new(),
        });
        (handle, receiver)
    }

    /// Queues a serialized payload without waiting.
    pub fn try_enqueue(&self, payload: String) -> Result<(), EnqueueError> {
        if !self.is_active() {
            return Err(EnqueueError::Closed);
        }
        match self.sender.try_send(payload) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(EnqueueError::Full),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(EnqueueError::Closed),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Check if connection is accepting payloads
    pub fn is_active(&self) -> bool {
        self.state() == ConnectionState::Active
    }

    /// Moves `active → closing` and wakes both loops.
    ///
    /// Returns `true` only for the caller that performed the transition.
    pub fn begin_close(&self) -> bool {
        let moved = self
            .state
            .compare_exchange(
                ConnectionState::Active.as_u8(),
                ConnectionState::Closing.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        self.shutdown.cancel();
        moved
    }

    /// Moves to the terminal `closed` state and wakes both loops.
    ///
    /// Returns `true` only for the first caller.
    pub fn mark_closed(&self) -> bool {
        let previous = self
            .state
            .swap(ConnectionState::Closed.as_u8(), Ordering::SeqCst);
        self.shutdown.cancel();
        previous != ConnectionState::Closed.as_u8()
    }

    /// Resolves once teardown has been requested.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }

    /// Number of payloads waiting in the outbound queue.
    pub fn queued(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    /// Get a snapshot of connection info
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            user_id: self.user_id.clone(),
            connected_at: self.connected_at,
            state: self.state(),
            queued: self.queued(),
        }
    }
}

/// Snapshot of connection info (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection ID
    pub id: ConnectionId,
    /// User ID
    pub user_id: String,
    /// Connected at
    pub connected_at: DateTime<Utc>,
    /// Lifecycle state
    pub state: ConnectionState,
    /// Payloads waiting to be written
    pub queued: usize,
}
