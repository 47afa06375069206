use liveclass_client::{ClientError, HttpRelayClient, RosterSource, SignalingTransport};
use liveclass_core::{ClassId, SendSignalRequest, SessionDescription, SignalKind};

use super::spawn_relay;
use crate::integration::init_tracing;
use crate::utils::TestClass;

#[tokio::test]
async fn test_send_poll_and_roster_over_http() {
    init_tracing();

    let class = TestClass::new();
    let a = class.member();
    let b = class.member();
    let addr = spawn_relay(class.service.clone()).await;
    let base = format!("http://{}", addr);

    let alice = HttpRelayClient::new(&base, &a.token).unwrap();
    let bob = HttpRelayClient::new(format!("{}/", base), &b.token).unwrap();

    assert_eq!(alice.identity().await.unwrap(), a.id);
    assert_eq!(bob.identity().await.unwrap(), b.id);

    let mut roster = alice.participants(&class.class_id).await.unwrap();
    roster.sort();
    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(roster, expected);

    let offer = SessionDescription::offer("v=0 over http");
    let created = alice
        .send(SendSignalRequest {
            class_id: class.class_id,
            receiver_id: b.id,
            message_type: SignalKind::Offer,
            payload: offer.to_payload(),
        })
        .await
        .unwrap();
    assert_eq!(created.sender_id, a.id);

    let messages = bob.poll(&class.class_id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id, created.id);
    assert_eq!(
        SessionDescription::from_payload(SignalKind::Offer, &messages[0].payload).unwrap(),
        offer
    );

    assert!(bob.poll(&class.class_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_relay_rejections_map_to_client_errors() {
    init_tracing();

    let class = TestClass::new();
    let a = class.member();
    let addr = spawn_relay(class.service.clone()).await;
    let base = format!("http://{}", addr);

    let stranger = HttpRelayClient::new(&base, "no-such-session").unwrap();
    assert_eq!(
        stranger.poll(&class.class_id).await,
        Err(ClientError::Unauthenticated)
    );
    assert_eq!(stranger.identity().await, Err(ClientError::Unauthenticated));

    let alice = HttpRelayClient::new(&base, &a.token).unwrap();
    let unknown = alice.poll(&ClassId::new()).await.unwrap_err();
    assert!(matches!(unknown, ClientError::InvalidRequest(_)));

    let eve = liveclass_core::ParticipantId::new();
    let send = alice
        .send(SendSignalRequest {
            class_id: class.class_id,
            receiver_id: eve,
            message_type: SignalKind::Candidate,
            payload: serde_json::json!({ "candidate": "candidate:1" }),
        })
        .await
        .unwrap_err();
    assert!(matches!(send, ClientError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_unreachable_relay_is_transient() {
    init_tracing();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpRelayClient::new(format!("http://{}", addr), "token").unwrap();
    let err = client.poll(&ClassId::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::TransientNetworkFailure(_)));
}
