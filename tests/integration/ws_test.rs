//! Integration tests for the WebSocket upgrade and connection lifecycle.

use http::StatusCode;
use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::helpers::TestApp;

async fn upgrade_status(url: String) -> Option<StatusCode> {
    match connect_async(url).await {
        Err(WsError::Http(response)) => Some(response.status()),
        _ => None,
    }
}

#[tokio::test]
async fn test_upgrade_without_token_rejected() {
    let app = TestApp::new().await;

    let status = upgrade_status(format!("ws://{}/ws", app.addr)).await;
    assert_eq!(status, Some(StatusCode::UNAUTHORIZED));
    assert_eq!(app.hub().connection_count(), 0);
}

#[tokio::test]
async fn test_upgrade_with_forged_token_rejected() {
    let app = TestApp::new().await;

    let claims = chathub_api::Claims::new("mallory", chrono::Duration::minutes(5));
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"not-the-server-secret"),
    )
    .expect("encode");

    let status = upgrade_status(app.ws_url(&forged)).await;
    assert_eq!(status, Some(StatusCode::UNAUTHORIZED));
    assert!(!app.hub().is_online("mallory"));
}

#[tokio::test]
async fn test_bearer_header_accepted() {
    let app = TestApp::new().await;
    let _alice = app.connect_with_header("alice").await;

    assert!(app.hub().is_online("alice"));
}

#[tokio::test]
async fn test_bad_frames_keep_connection_open() {
    let app = TestApp::new().await;
    let mut alice = app.connect("alice").await;

    alice.send_text("{{{ not json".to_string()).await;
    alice.send_json(&json!({"type": "dance", "data": {}})).await;
    alice.send_json(&json!({"type": "typing-start", "data": 7})).await;
    alice.expect_quiet().await;

    app.settle().await;
    assert!(app.hub().is_online("alice"));

    app.hub()
        .send_to_user("alice", &json!({"type": "new-message", "data": {"id": 1}}));
    let event = alice.next_of_type("new-message").await.expect("delivery");
    assert_eq!(event["data"]["id"], 1);
}

#[tokio::test]
async fn test_client_close_unregisters() {
    let app = TestApp::new().await;
    let alice = app.connect("alice").await;
    let mut bob = app.connect("bob").await;

    alice.close().await;

    let offline = bob.next_of_type("user-offline").await.expect("offline event");
    assert_eq!(offline["data"]["user_id"], "alice");
    app.settle().await;
    assert!(!app.hub().is_online("alice"));
    assert_eq!(app.hub().connection_count(), 1);
}

#[tokio::test]
async fn test_engine_shutdown_closes_sockets() {
    let app = TestApp::new().await;
    let mut alice = app.connect("alice").await;

    app.state.realtime.shutdown().await.expect("shutdown");

    assert!(alice.is_closed_by_server().await);
    assert_eq!(app.hub().connection_count(), 0);
}
