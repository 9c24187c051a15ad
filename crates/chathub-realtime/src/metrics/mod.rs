//! Hub metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Hub-level metrics counters.
#[derive(Debug, Default)]
pub struct HubMetrics {
    /// Total connections registered
    pub connections_total: AtomicU64,
    /// Connections currently registered
    pub connections_active: AtomicU64,
    /// Payloads queued for delivery
    pub messages_sent: AtomicU64,
    /// Data frames received from clients
    pub messages_received: AtomicU64,
    /// Inbound frames dropped as malformed or unknown
    pub messages_dropped: AtomicU64,
    /// Connections torn down because their queue was full
    pub backpressure_disconnects: AtomicU64,
    /// Connections torn down by the read deadline
    pub heartbeat_timeouts: AtomicU64,
    /// Presence broadcasts fired
    pub presence_broadcasts: AtomicU64,
}

impl HubMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registration
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a removal
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record `count` payloads queued
    pub fn message_sent_count(&self, count: u64) {
        self.messages_sent.fetch_add(count, Ordering::Relaxed);
    }

    /// Record an inbound data frame
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped inbound frame
    pub fn message_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a backpressure teardown
    pub fn backpressure_disconnect(&self) {
        self.backpressure_disconnects.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a heartbeat timeout
    pub fn heartbeat_timeout(&self) {
        self.heartbeat_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a presence broadcast
    pub fn presence_broadcast(&self) {
        self.presence_broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            backpressure_disconnects: self.backpressure_disconnects.load(Ordering::Relaxed),
            heartbeat_timeouts: self.heartbeat_timeouts.load(Ordering::Relaxed),
            presence_broadcasts: self.presence_broadcasts.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total connections ever registered
    pub connections_total: u64,
    /// Currently registered connections
    pub connections_active: u64,
    /// Payloads queued for delivery
    pub messages_sent: u64,
    /// Data frames received
    pub messages_received: u64,
    /// Inbound frames dropped
    pub messages_dropped: u64,
    /// Backpressure teardowns
    pub backpressure_disconnects: u64,
    /// Heartbeat timeouts
    pub heartbeat_timeouts: u64,
    /// Presence broadcasts fired
    pub presence_broadcasts: u64,
}
