use liveclass_client::{
    HttpRelayClient, LiveClassSession, PeerState, RosterSource, SessionOptions,
};
use std::sync::Arc;

use super::spawn_relay;
use crate::integration::init_tracing;
use crate::utils::TestClass;

#[tokio::test]
async fn test_two_sessions_negotiate_over_http() {
    init_tracing();

    let class = TestClass::new();
    let a = class.member();
    let b = class.member();
    let addr = spawn_relay(class.service.clone()).await;
    let base = format!("http://{}", addr);

    let alice_relay = Arc::new(HttpRelayClient::new(&base, &a.token).unwrap());
    let bob_relay = Arc::new(HttpRelayClient::new(&base, &b.token).unwrap());
    let alice_id = alice_relay.identity().await.unwrap();
    let bob_id = bob_relay.identity().await.unwrap();
    assert_eq!((alice_id, bob_id), (a.id, b.id));

    let mut alice = LiveClassSession::new(
        class.class_id,
        alice_id,
        alice_relay.clone(),
        a.factory.clone(),
        SessionOptions::default(),
    );
    let mut bob = LiveClassSession::new(
        class.class_id,
        bob_id,
        bob_relay,
        b.factory.clone(),
        SessionOptions::default(),
    );

    let roster = alice_relay.participants(&class.class_id).await.unwrap();
    assert_eq!(alice.join(&roster).await.unwrap(), 1);
    bob.poll_once().await.unwrap();
    alice.poll_once().await.unwrap();

    assert_eq!(alice.peer_state(&b.id), Some(PeerState::RemoteDescriptionSet));
    assert_eq!(bob.peer_state(&a.id), Some(PeerState::RemoteDescriptionSet));
    assert_eq!(class.pending().await, 0);
}
