//! # chathub-realtime
//!
//! In-process real-time hub for ChatHub. Provides:
//!
//! - Per-connection read and write loops with heartbeat and write deadlines
//! - A presence registry mapping each user to their current connection
//! - A serialized event loop for connect/disconnect
//! - A lock-based routing API for direct, conversation, session, and
//!   all-connection delivery
//! - Fail-fast backpressure on bounded outbound queues

pub mod connection;
pub mod directory;
pub mod hub;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod server;

pub use connection::{ConnectionHandle, Frame};
pub use directory::{ConversationDirectory, InMemoryDirectory};
pub use hub::Hub;
pub use message::{Envelope, OutboundMessage};
pub use metrics::HubMetrics;
pub use presence::PresenceRegistry;
pub use server::RealtimeEngine;
