//! Integration tests for routing and typing relay.

use serde_json::json;

use chathub_realtime::OutboundMessage;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_typing_relayed_to_other_participants() {
    let app = TestApp::new().await;
    app.directory.set_participants("c1", ["alice", "bob"]);

    let mut alice = app.connect("alice").await;
    let mut bob = app.connect("bob").await;
    let mut carol = app.connect("carol").await;

    // The claimed user_id is ignored; identity comes from the token.
    alice
        .send_json(&json!({
            "type": "typing-start",
            "data": {"conversation_id": "c1", "user_id": "carol"}
        }))
        .await;

    let typing = bob.next_of_type("typing-start").await.expect("typing event");
    assert_eq!(typing["data"]["user_id"], "alice");
    assert_eq!(typing["data"]["conversation_id"], "c1");

    alice.expect_quiet().await;
    carol.expect_quiet().await;
}

#[tokio::test]
async fn test_collaborator_routes_new_message() {
    let app = TestApp::new().await;
    let mut alice = app.connect("alice").await;
    let mut bob = app.connect("bob").await;

    app.hub().send_to_conversation_excluding_sender(
        &["alice", "bob", "offline-user"],
        "alice",
        &OutboundMessage::NewMessage(json!({"id": 42, "text": "hello"})),
    );

    let event = bob.next_of_type("new-message").await.expect("delivery");
    assert_eq!(event["data"]["text"], "hello");
    alice.expect_quiet().await;
}

#[tokio::test]
async fn test_session_broadcast_reaches_all_participants() {
    let app = TestApp::new().await;
    let mut alice = app.connect("alice").await;
    let mut bob = app.connect("bob").await;

    let participants = vec!["alice".to_string(), "bob".to_string()];
    app.hub().send_to_session_excluding(
        &participants,
        None,
        &json!({"type": "session-ended", "data": {"session_id": "s1"}}),
    );

    assert!(alice.next_of_type("session-ended").await.is_some());
    assert!(bob.next_of_type("session-ended").await.is_some());
}
