//! WebSocket connection: handle, frames, heartbeat and the read/write loops.

pub mod frame;
pub mod handle;
pub mod heartbeat;
pub mod reader;
pub mod session;
pub mod writer;

pub use frame::{DisconnectReason, Frame};
pub use handle::{ConnectionHandle, ConnectionId, ConnectionInfo, ConnectionState, EnqueueError};
pub use heartbeat::HeartbeatConfig;
