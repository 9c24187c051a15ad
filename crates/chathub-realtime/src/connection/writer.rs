//! Write loop: one per connection.

use std::fmt::Display;

use futures::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, trace};

use super::frame::{DisconnectReason, Frame};
use super::handle::ConnectionHandle;
use super::heartbeat::HeartbeatConfig;

/// Upper bound on frames coalesced into a single flush.
const MAX_BATCH: usize = 64;

/// Drains the outbound queue into the sink and sends periodic pings.
///
/// Exits after writing a close frame once teardown is requested, or
/// immediately on any write failure or deadline.
pub async fn run_writer<K>(
    handle: &ConnectionHandle,
    queue: &mut mpsc::Receiver<String>,
    sink: &mut K,
    heartbeat: HeartbeatConfig,
) -> DisconnectReason
where
    K: Sink<Frame> + Unpin,
    K::Error: Display,
{
    let mut ping = heartbeat.ping_timer();

    loop {
        tokio::select! {
            biased;

            _ = handle.closed() => {
                close(sink, heartbeat, handle).await;
                return DisconnectReason::Closed;
            }

            _ = ping.tick() => {
                trace!(conn_id = %handle.id, "Sending ping");
                if let Err(reason) = write_batch(sink, vec![Frame::Ping(Vec::new())], heartbeat).await {
                    debug!(conn_id = %handle.id, %reason, "Ping failed");
                    return reason;
                }
            }

            payload = queue.recv() => {
                let Some(payload) = payload else {
                    close(sink, heartbeat, handle).await;
                    return DisconnectReason::Closed;
                };

                let mut batch = vec![Frame::Text(payload)];
                while batch.len() < MAX_BATCH {
                    match queue.try_recv() {
                        Ok(next) => batch.push(Frame::Text(next)),
                        Err(_) => break,
                    }
                }

                if let Err(reason) = write_batch(sink, batch, heartbeat).await {
                    debug!(conn_id = %handle.id, %reason, "Write failed");
                    return reason;
                }
            }
        }
    }
}

/// Feeds every frame then flushes once, all under one write deadline.
async fn write_batch<K>(
    sink: &mut K,
    batch: Vec<Frame>,
    heartbeat: HeartbeatConfig,
) -> Result<(), DisconnectReason>
where
    K: Sink<Frame> + Unpin,
    K::Error: Display,
{
    let write = async {
        for frame in batch {
            sink.feed(frame).await?;
        }
        sink.flush().await
    };

    match time::timeout(heartbeat.write_timeout, write).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(DisconnectReason::WriteError(e.to_string())),
        Err(_) => Err(DisconnectReason::WriteTimeout),
    }
}

async fn close<K>(sink: &mut K, heartbeat: HeartbeatConfig, handle: &ConnectionHandle)
where
    K: Sink<Frame> + Unpin,
    K::Error: Display,
{
    if let Err(reason) = write_batch(sink, vec![Frame::Close], heartbeat).await {
        debug!(conn_id = %handle.id, %reason, "Close frame not delivered");
    }
}
