//! Drives one connection from registration to teardown.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Sink, Stream};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::hub::Hub;

use super::frame::{DisconnectReason, Frame};
use super::handle::ConnectionHandle;
use super::heartbeat::HeartbeatConfig;
use super::reader::run_reader;
use super::writer::run_writer;

/// Registers the connection, runs its read loop on the current task and its
/// write loop on a spawned task, then signals disconnect exactly once.
///
/// Whichever loop stops first requests teardown so the other one follows.
pub async fn serve<S, K, E>(
    hub: Arc<Hub>,
    handle: Arc<ConnectionHandle>,
    mut queue: mpsc::Receiver<String>,
    mut stream: S,
    mut sink: K,
) where
    S: Stream<Item = Result<Frame, E>> + Unpin,
    E: Display,
    K: Sink<Frame> + Unpin + Send + 'static,
    K::Error: Display,
{
    if let Err(e) = hub.connect(handle.clone()) {
        warn!(conn_id = %handle.id, error = %e, "Hub unavailable, dropping connection");
        handle.mark_closed();
        return;
    }

    let heartbeat = HeartbeatConfig::from(hub.config());

    let writer_handle = handle.clone();
    let writer = tokio::spawn(async move {
        let reason = run_writer(&writer_handle, &mut queue, &mut sink, heartbeat).await;
        writer_handle.begin_close();
        reason
    });

    let read_reason = run_reader(&hub, &handle, &mut stream, heartbeat).await;
    handle.begin_close();

    let write_reason = match writer.await {
        Ok(reason) => reason,
        Err(e) => DisconnectReason::WriteError(format!("writer task failed: {e}")),
    };

    info!(
        conn_id = %handle.id,
        user_id = %handle.user_id,
        read = %read_reason,
        write = %write_reason,
        "WebSocket connection finished"
    );

    hub.disconnect(handle);
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::time::Duration;

    use futures::StreamExt;
    use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
    use serde_json::json;
    use tokio::task::JoinHandle;
    use tokio::time;

    use chathub_core::config::RealtimeConfig;

    use super::serve;
    use crate::connection::frame::Frame;
    use crate::hub::Hub;
    use crate::hub::test_support::{settle, spawn_hub};

    struct Peer {
        inbound: UnboundedSender<Result<Frame, io::Error>>,
        outbound: UnboundedReceiver<Frame>,
        task: JoinHandle<()>,
    }

    impl Peer {
        /// Spawns a session and lets it queue its connect event.
        async fn open(hub: &Arc<Hub>, user_id: &str) -> Self {
            let (inbound, stream) = unbounded();
            let (sink, outbound) = unbounded();
            let (handle, queue) = hub.new_connection(user_id);
            let task = tokio::spawn(serve(hub.clone(), handle, queue, stream, sink));
            settle().await;
            Self {
                inbound,
                outbound,
                task,
            }
        }

        fn send(&self, frame: Frame) {
            self.inbound.unbounded_send(Ok(frame)).expect("peer inbound");
        }

        async fn next(&mut self) -> Option<Frame> {
            time::timeout(Duration::from_secs(1), self.outbound.next())
                .await
                .ok()
                .flatten()
        }

        async fn next_text(&mut self) -> Option<serde_json::Value> {
            while let Some(frame) = self.next().await {
                if let Frame::Text(text) = frame {
                    return serde_json::from_str(&text).ok();
                }
            }
            None
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_peer_times_out() {
        let (hub, _dir, _shutdown) = spawn_hub(RealtimeConfig::default());
        let mut peer = Peer::open(&hub, "alice").await;
        hub.barrier().await.expect("barrier");
        assert!(hub.is_online("alice"));

        time::sleep(Duration::from_secs(59)).await;
        hub.barrier().await.expect("barrier");
        assert!(hub.is_online("alice"));

        time::sleep(Duration::from_secs(2)).await;
        hub.barrier().await.expect("barrier");
        assert!(!hub.is_online("alice"));
        assert_eq!(hub.metrics().snapshot().heartbeat_timeouts, 1);

        let mut saw_ping = false;
        let mut saw_close = false;
        while let Some(frame) = peer.next().await {
            match frame {
                Frame::Ping(_) => saw_ping = true,
                Frame::Close => saw_close = true,
                _ => {}
            }
        }
        assert!(saw_ping);
        assert!(saw_close);
        peer.task.await.expect("session task");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pongs_keep_connection_alive() {
        let (hub, _dir, _shutdown) = spawn_hub(RealtimeConfig::default());
        let peer = Peer::open(&hub, "alice").await;

        for _ in 0..4 {
            time::sleep(Duration::from_secs(40)).await;
            peer.send(Frame::Pong(Vec::new()));
        }
        hub.barrier().await.expect("barrier");
        assert!(hub.is_online("alice"));
        assert_eq!(hub.metrics().snapshot().heartbeat_timeouts, 0);
    }

    #[tokio::test]
    async fn test_malformed_frames_do_not_close() {
        let (hub, _dir, _shutdown) = spawn_hub(RealtimeConfig::default());
        let peer = Peer::open(&hub, "alice").await;

        peer.send(Frame::Text("{{{".to_string()));
        peer.send(Frame::Text(r#"{"type":"unheard-of","data":1}"#.to_string()));
        peer.send(Frame::Binary(vec![0, 1, 2]));

        time::sleep(Duration::from_millis(50)).await;
        hub.barrier().await.expect("barrier");

        assert!(hub.is_online("alice"));
        assert_eq!(hub.metrics().snapshot().messages_dropped, 3);
    }

    #[tokio::test]
    async fn test_routed_message_reaches_socket() {
        let (hub, _dir, _shutdown) = spawn_hub(RealtimeConfig::default());
        let mut peer = Peer::open(&hub, "alice").await;
        hub.barrier().await.expect("barrier");

        let online = peer.next_text().await.expect("presence frame");
        assert_eq!(online["type"], "user-online");

        hub.send_to_user("alice", &json!({"type": "new-message", "data": {"text": "hi"}}));
        let frame = peer.next_text().await.expect("routed frame");
        assert_eq!(frame["data"]["text"], "hi");
    }

    #[tokio::test]
    async fn test_peer_close_unregisters() {
        let (hub, _dir, _shutdown) = spawn_hub(RealtimeConfig::default());
        let mut peer = Peer::open(&hub, "alice").await;
        hub.barrier().await.expect("barrier");

        peer.send(Frame::Close);
        (&mut peer.task).await.expect("session task");
        hub.barrier().await.expect("barrier");

        assert!(!hub.is_online("alice"));
        assert_eq!(hub.connection_count(), 0);

        let mut frames = Vec::new();
        while let Some(frame) = peer.next().await {
            frames.push(frame);
        }
        assert_eq!(frames.last(), Some(&Frame::Close));
    }

    #[tokio::test]
    async fn test_write_failure_tears_down() {
        let (hub, _dir, _shutdown) = spawn_hub(RealtimeConfig::default());
        let Peer {
            inbound: _inbound,
            outbound,
            task,
        } = Peer::open(&hub, "alice").await;
        hub.barrier().await.expect("barrier");

        drop(outbound);
        hub.send_to_user("alice", &json!({"type": "new-message"}));

        task.await.expect("session task");
        hub.barrier().await.expect("barrier");
        assert!(!hub.is_online("alice"));
    }
}
