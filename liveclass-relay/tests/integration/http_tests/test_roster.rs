use axum::http::{Method, StatusCode};
use liveclass_core::ClassId;

use crate::integration::init_tracing;
use crate::utils::{TestRelay, call};

#[tokio::test]
async fn test_member_can_list_class_participants() {
    init_tracing();

    let relay = TestRelay::new();
    let alice = relay.participant("alice");
    let bob = relay.participant("bob");

    let uri = format!("/api/live-classes/{}/participants", relay.class_id);
    let (status, body) = call(&relay.router(), Method::GET, &uri, Some(&alice.token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classId"], relay.class_id.to_string());
    let participants: Vec<&str> = body["participants"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p.as_str())
        .collect();
    assert_eq!(participants.len(), 2);
    assert!(participants.contains(&alice.id.to_string().as_str()));
    assert!(participants.contains(&bob.id.to_string().as_str()));
}

#[tokio::test]
async fn test_roster_rejects_outsiders_and_unknown_classes() {
    init_tracing();

    let relay = TestRelay::new();
    let router = relay.router();
    let alice = relay.participant("alice");
    let eve = relay.outsider("eve");

    let uri = format!("/api/live-classes/{}/participants", relay.class_id);
    let (status, _) = call(&router, Method::GET, &uri, Some(&eve.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/live-classes/{}/participants", ClassId::new());
    let (status, _) = call(&router, Method::GET, &uri, Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &router,
        Method::GET,
        "/api/live-classes/class-101/participants",
        Some(&alice.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
