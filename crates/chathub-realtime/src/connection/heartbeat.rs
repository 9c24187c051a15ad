//! Ping/pong heartbeat timing for WebSocket keepalive.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use chathub_core::config::RealtimeConfig;

/// Heartbeat configuration
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Read deadline; a peer silent for this long is considered dead
    pub read_timeout: Duration,
    /// Deadline for a single write or flush
    pub write_timeout: Duration,
}

impl HeartbeatConfig {
    /// Timer that first fires one full interval after creation.
    pub fn ping_timer(&self) -> Interval {
        let mut interval = time::interval_at(Instant::now() + self.ping_interval, self.ping_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: config.ping_interval(),
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
        }
    }
}
