use axum::http::StatusCode;
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::{TestRelay, poll_signals, post_signal};

#[tokio::test]
async fn test_posted_signal_is_returned_once_by_poll() {
    init_tracing();

    let relay = TestRelay::new();
    let router = relay.router();
    let alice = relay.participant("alice");
    let bob = relay.participant("bob");
    let class_id = relay.class_id.to_string();

    let (status, created) = post_signal(
        &router,
        Some(&alice.token),
        json!({
            "classId": class_id,
            "receiverId": bob.id.to_string(),
            "messageType": "offer",
            "payload": { "type": "offer", "sdp": "v=0\r\n" },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["senderId"], alice.id.to_string());
    assert_eq!(created["receiverId"], bob.id.to_string());
    assert_eq!(created["messageType"], "offer");
    assert!(created["id"].is_string());
    assert!(created["createdAt"].is_string());

    let (status, body) = poll_signals(&router, Some(&bob.token), &class_id).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["id"], created["id"]);
    assert_eq!(messages[0]["payload"]["sdp"], "v=0\r\n");

    let (status, body) = poll_signals(&router, Some(&bob.token), &class_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"], json!([]));
}

#[tokio::test]
async fn test_sender_comes_from_session_not_body() {
    init_tracing();

    let relay = TestRelay::new();
    let router = relay.router();
    let alice = relay.participant("alice");
    let bob = relay.participant("bob");
    let mallory = relay.participant("mallory");

    let (status, created) = post_signal(
        &router,
        Some(&mallory.token),
        json!({
            "classId": relay.class_id.to_string(),
            "senderId": alice.id.to_string(),
            "receiverId": bob.id.to_string(),
            "messageType": "candidate",
            "payload": { "candidate": "candidate:1", "sdpMid": "0", "sdpMLineIndex": 0 },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["senderId"], mallory.id.to_string());

    let (_, body) = poll_signals(&router, Some(&bob.token), &relay.class_id.to_string()).await;
    assert_eq!(body["messages"][0]["senderId"], mallory.id.to_string());
}

#[tokio::test]
async fn test_empty_mailbox_polls_empty_list() {
    init_tracing();

    let relay = TestRelay::new();
    let bob = relay.participant("bob");

    let (status, body) =
        poll_signals(&relay.router(), Some(&bob.token), &relay.class_id.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "messages": [] }));
}
