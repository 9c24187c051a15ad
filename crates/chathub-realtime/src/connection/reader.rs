//! Read loop: one per connection.

use std::fmt::Display;

use futures::{Stream, StreamExt};
use tokio::time;
use tracing::{debug, trace, warn};

use crate::hub::Hub;

use super::frame::{DisconnectReason, Frame};
use super::handle::ConnectionHandle;
use super::heartbeat::HeartbeatConfig;

/// Reads frames until the peer goes away, the read deadline passes, or the
/// hub requests teardown.
///
/// Every received frame, pong or data, resets the deadline. Bad data frames
/// are dropped by [`Hub::handle_inbound`] without ending the loop.
pub async fn run_reader<S, E>(
    hub: &Hub,
    handle: &ConnectionHandle,
    stream: &mut S,
    heartbeat: HeartbeatConfig,
) -> DisconnectReason
where
    S: Stream<Item = Result<Frame, E>> + Unpin,
    E: Display,
{
    loop {
        let next = tokio::select! {
            _ = handle.closed() => return DisconnectReason::Closed,
            next = time::timeout(heartbeat.read_timeout, stream.next()) => next,
        };

        let frame = match next {
            Err(_) => {
                warn!(
                    conn_id = %handle.id,
                    user_id = %handle.user_id,
                    timeout = ?heartbeat.read_timeout,
                    "Read deadline exceeded"
                );
                hub.metrics().heartbeat_timeout();
                return DisconnectReason::ReadTimeout;
            }
            Ok(None) => return DisconnectReason::PeerClosed,
            Ok(Some(Err(e))) => {
                debug!(conn_id = %handle.id, error = %e, "WebSocket read error");
                return DisconnectReason::ReadError(e.to_string());
            }
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Frame::Text(text) => hub.handle_inbound(handle, &text).await,
            Frame::Binary(data) => {
                debug!(conn_id = %handle.id, len = data.len(), "Ignoring binary frame");
                hub.metrics().message_dropped();
            }
            Frame::Pong(_) | Frame::Ping(_) => {
                trace!(conn_id = %handle.id, "Control frame received");
            }
            Frame::Close => return DisconnectReason::PeerClosed,
        }
    }
}
