//! Real-time hub configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// What the hub does with a user's previous connection when the same user
/// connects again.
///
/// Under either policy the displaced connection stops being the user's
/// current one, so its eventual disconnect does not broadcast `user-offline`;
/// only the current connection going away takes the user offline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconnectPolicy {
    /// Replace the registry entry and leave the old socket running until its
    /// own I/O fails.
    #[default]
    KeepOrphan,
    /// Replace the registry entry and close the old socket.
    ClosePrevious,
}

/// Real-time (WebSocket) hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of each connection's outbound queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Read deadline in seconds; a silent peer is dropped after this long.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_seconds: u64,
    /// Interval between server pings in seconds. Must be below the read timeout.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Deadline for a single write or flush in seconds.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_seconds: u64,
    /// Largest inbound text frame accepted, in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
    /// Behaviour when a user opens a second connection.
    #[serde(default)]
    pub reconnect_policy: ReconnectPolicy,
}

impl RealtimeConfig {
    /// Read deadline as a [`Duration`].
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_seconds)
    }

    /// Ping interval as a [`Duration`].
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_seconds)
    }

    /// Write deadline as a [`Duration`].
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_seconds)
    }

    /// Validates timing and sizing constraints.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.queue_capacity == 0 {
            return Err(AppError::configuration(
                "realtime.queue_capacity must be greater than zero",
            ));
        }

        if self.read_timeout_seconds == 0
            || self.ping_interval_seconds == 0
            || self.write_timeout_seconds == 0
        {
            return Err(AppError::configuration(
                "realtime timeouts and intervals must be non-zero",
            ));
        }

        if self.ping_interval_seconds >= self.read_timeout_seconds {
            return Err(AppError::configuration(format!(
                "realtime.ping_interval_seconds ({}) must be less than read_timeout_seconds ({})",
                self.ping_interval_seconds, self.read_timeout_seconds
            )));
        }

        if self.max_message_bytes == 0 {
            return Err(AppError::configuration(
                "realtime.max_message_bytes must be greater than zero",
            ));
        }

        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            read_timeout_seconds: default_read_timeout(),
            ping_interval_seconds: default_ping_interval(),
            write_timeout_seconds: default_write_timeout(),
            max_message_bytes: default_max_message_bytes(),
            reconnect_policy: ReconnectPolicy::default(),
        }
    }
}

fn default_queue_capacity() -> usize {
    256
}

fn default_read_timeout() -> u64 {
    60
}

// 90% of the read timeout.
fn default_ping_interval() -> u64 {
    54
}

fn default_write_timeout() -> u64 {
    10
}

fn default_max_message_bytes() -> usize {
    65_536
}
