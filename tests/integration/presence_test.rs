//! Integration tests for presence announcements and reconnects.

use std::time::Duration;

use serde_json::json;

use chathub_core::config::{RealtimeConfig, ReconnectPolicy};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_online_announced_to_everyone() {
    let app = TestApp::new().await;
    let mut alice = app.connect("alice").await;
    let _bob = app.connect("bob").await;

    alice.expect_online("bob").await;

    let mut online = app.hub().list_online();
    online.sort();
    assert_eq!(online, vec!["alice".to_string(), "bob".to_string()]);
}

#[tokio::test]
async fn test_reconnect_routes_to_newest_socket() {
    let app = TestApp::new().await;
    let mut first = app.connect("alice").await;
    let mut second = app.connect("alice").await;
    app.settle().await;

    assert_eq!(app.hub().online_count(), 1);
    assert_eq!(app.hub().connection_count(), 2);

    app.hub()
        .send_to_user("alice", &json!({"type": "new-message", "data": {"id": 9}}));

    let event = second.next_of_type("new-message").await.expect("delivery");
    assert_eq!(event["data"]["id"], 9);
    first.expect_quiet().await;
}

#[tokio::test]
async fn test_orphan_close_keeps_user_online() {
    let app = TestApp::new().await;
    let first = app.connect("alice").await;
    let _second = app.connect("alice").await;
    let mut bob = app.connect("bob").await;

    first.close().await;
    for _ in 0..50 {
        app.settle().await;
        if app.hub().connection_count() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(app.hub().connection_count(), 2);
    assert!(app.hub().is_online("alice"));
    while let Some(event) = bob.next_event_within(Duration::from_millis(200)).await {
        assert_ne!(event["type"], "user-offline", "orphan close announced: {event}");
    }
}

#[tokio::test]
async fn test_close_previous_policy_drops_old_socket() {
    let app = TestApp::with_realtime(RealtimeConfig {
        reconnect_policy: ReconnectPolicy::ClosePrevious,
        ..RealtimeConfig::default()
    })
    .await;

    let mut first = app.connect("alice").await;
    let _second = app.connect("alice").await;

    assert!(first.is_closed_by_server().await);
    app.settle().await;
    assert!(app.hub().is_online("alice"));
}
