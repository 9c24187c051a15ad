//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as TokenTtl;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use chathub_api::{AppState, JwtAuthenticator, build_app};
use chathub_core::config::{AppConfig, RealtimeConfig};
use chathub_realtime::{Frame, Hub, InMemoryDirectory, RealtimeEngine};

/// Test server context
pub struct TestApp {
    /// Bound address
    pub addr: SocketAddr,
    /// Shared state, for reaching the hub directly
    pub state: AppState,
    /// Conversation membership
    pub directory: Arc<InMemoryDirectory>,
    /// Token issuer matching the server's secret
    pub authenticator: JwtAuthenticator,
    server: JoinHandle<()>,
}

impl TestApp {
    /// Starts a server with default configuration
    pub async fn new() -> Self {
        Self::with_realtime(RealtimeConfig::default()).await
    }

    /// Starts a server with custom hub settings
    pub async fn with_realtime(realtime: RealtimeConfig) -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-secret".to_string();
        config.realtime = realtime;

        let directory = Arc::new(InMemoryDirectory::new());
        let authenticator = JwtAuthenticator::new(&config.auth);
        let engine = RealtimeEngine::start(config.realtime.clone(), directory.clone());
        let state = AppState::new(
            Arc::new(config),
            engine,
            Arc::new(authenticator.clone()),
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let app = build_app(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server");
        });

        Self {
            addr,
            state,
            directory,
            authenticator,
            server,
        }
    }

    /// The hub behind the server
    pub fn hub(&self) -> &Arc<Hub> {
        &self.state.realtime.hub
    }

    /// Signs a valid token for `user_id`
    pub fn token(&self, user_id: &str) -> String {
        self.authenticator
            .issue(user_id, TokenTtl::minutes(5))
            .expect("Failed to issue token")
    }

    /// WebSocket URL carrying `token`
    pub fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/ws?token={token}", self.addr)
    }

    /// Connects as `user_id` and waits until the hub has announced it
    pub async fn connect(&self, user_id: &str) -> WsClient {
        let (stream, _) = connect_async(self.ws_url(&self.token(user_id)))
            .await
            .expect("WebSocket connect failed");
        let mut client = WsClient { stream };
        client.expect_online(user_id).await;
        client
    }

    /// Connects using an `Authorization` header instead of the query string
    pub async fn connect_with_header(&self, user_id: &str) -> WsClient {
        let mut request = format!("ws://{}/ws", self.addr)
            .into_client_request()
            .expect("client request");
        let value = format!("Bearer {}", self.token(user_id))
            .parse()
            .expect("header value");
        request.headers_mut().insert(http::header::AUTHORIZATION, value);

        let (stream, _) = connect_async(request).await.expect("WebSocket connect failed");
        let mut client = WsClient { stream };
        client.expect_online(user_id).await;
        client
    }

    /// Waits for every queued hub event to be applied
    pub async fn settle(&self) {
        self.hub().barrier().await.expect("barrier");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// WebSocket test client
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Next JSON event, skipping control frames. `None` on close or timeout.
    pub async fn next_event(&mut self) -> Option<Value> {
        self.next_event_within(Duration::from_secs(2)).await
    }

    /// Like `next_event` with a custom wait.
    pub async fn next_event_within(&mut self, wait: Duration) -> Option<Value> {
        loop {
            let message = time::timeout(wait, self.stream.next()).await.ok()??.ok()?;
            match Frame::from(message) {
                Frame::Text(text) => return serde_json::from_str(&text).ok(),
                Frame::Close => return None,
                _ => continue,
            }
        }
    }

    /// Next event of the given type, skipping others.
    pub async fn next_of_type(&mut self, kind: &str) -> Option<Value> {
        while let Some(event) = self.next_event().await {
            if event["type"] == kind {
                return Some(event);
            }
        }
        None
    }

    /// Waits for `user-online` announcing `user_id`.
    pub async fn expect_online(&mut self, user_id: &str) {
        while let Some(event) = self.next_event().await {
            if event["type"] == "user-online" && event["data"]["user_id"] == user_id {
                return;
            }
        }
        panic!("no user-online for {user_id}");
    }

    /// Asserts nothing but presence traffic arrives for a short while.
    pub async fn expect_quiet(&mut self) {
        while let Some(event) = self.next_event_within(Duration::from_millis(200)).await {
            let kind = event["type"].as_str().unwrap_or_default();
            assert!(
                kind == "user-online" || kind == "user-offline",
                "unexpected event: {event}"
            );
        }
    }

    /// Sends a JSON text frame.
    pub async fn send_json(&mut self, value: &Value) {
        self.send_text(value.to_string()).await;
    }

    /// Sends a raw text frame.
    pub async fn send_text(&mut self, text: String) {
        self.stream
            .send(Message::from(Frame::Text(text)))
            .await
            .expect("send failed");
    }

    /// Closes the socket from the client side.
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
        while let Some(Ok(_)) = self.stream.next().await {}
    }

    /// True once the server has closed the socket.
    pub async fn is_closed_by_server(&mut self) -> bool {
        loop {
            match time::timeout(Duration::from_secs(2), self.stream.next()).await {
                Err(_) => return false,
                Ok(None) | Ok(Some(Err(_))) => return true,
                Ok(Some(Ok(message))) => {
                    if Frame::from(message) == Frame::Close {
                        return true;
                    }
                }
            }
        }
    }
}
