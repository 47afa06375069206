use liveclass_client::{ClientError, LinkState, PeerState};
use liveclass_core::{SessionDescription, SignalKind};

use crate::integration::init_tracing;
use crate::utils::{FlakyTransport, TestClass};

#[tokio::test]
async fn test_local_candidates_are_relayed_to_the_remote() {
    init_tracing();

    let class = TestClass::new();
    let a = class.member();
    let b = class.member();
    let mut alice = class.session(&a);
    let mut bob = class.session(&b);

    alice.join(&[b.id]).await.unwrap();
    let conn = a.factory.latest(&b.id).unwrap();
    conn.emit_candidate("candidate:1 1 udp 2122260223 10.0.0.1 50001 typ host")
        .await;
    conn.emit_candidate("candidate:2 1 udp 2122260223 10.0.0.1 50002 typ host")
        .await;

    assert_eq!(alice.process_pending_events().await.unwrap(), 2);
    assert_eq!(class.pending().await, 3, "offer plus two candidates");

    assert_eq!(bob.poll_once().await.unwrap(), 3);
    let bob_conn = b.factory.latest(&a.id).unwrap();
    assert_eq!(bob_conn.applied_candidates().len(), 2);
    assert!(bob.peer(&a.id).unwrap().pending_candidates().is_empty());
}

#[tokio::test]
async fn test_connected_state_is_tracked() {
    init_tracing();

    let class = TestClass::new();
    let a = class.member();
    let b = class.member();
    let mut alice = class.session(&a);
    let mut bob = class.session(&b);

    alice.join(&[b.id]).await.unwrap();
    bob.poll_once().await.unwrap();
    alice.poll_once().await.unwrap();

    let conn = a.factory.latest(&b.id).unwrap();
    conn.emit_state(LinkState::Connecting).await;
    conn.emit_state(LinkState::Connected).await;
    alice.process_pending_events().await.unwrap();

    assert_eq!(alice.peer_state(&b.id), Some(PeerState::Connected));
}

#[tokio::test]
async fn test_departed_peer_is_removed_and_can_rejoin() {
    init_tracing();

    let class = TestClass::new();
    let a = class.member();
    let b = class.member();
    let mut alice = class.session(&a);
    let mut bob = class.session(&b);

    alice.join(&[b.id]).await.unwrap();
    bob.poll_once().await.unwrap();
    alice.poll_once().await.unwrap();

    let conn = a.factory.latest(&b.id).unwrap();
    conn.emit_state(LinkState::Failed).await;
    alice.process_pending_events().await.unwrap();

    assert!(alice.peer(&b.id).is_none());
    assert_eq!(conn.close_count(), 1);

    // Late events from the dead connection change nothing.
    conn.emit_candidate("candidate:7 1 udp 1 10.0.0.7 50007 typ host")
        .await;
    alice.process_pending_events().await.unwrap();
    assert_eq!(class.pending().await, 0);

    // Bob comes back with a fresh offer.
    class
        .send_raw(&b, &a, SignalKind::Offer, SessionDescription::offer("v=0 again").to_payload())
        .await;
    alice.poll_once().await.unwrap();
    assert_eq!(alice.peer_state(&b.id), Some(PeerState::RemoteDescriptionSet));
    assert_eq!(a.factory.connections_to(&b.id).len(), 2);
}

#[tokio::test]
async fn test_events_from_replaced_connection_are_ignored() {
    init_tracing();

    let class = TestClass::new();
    let (polite, impolite) = class.ordered_pair();
    let mut low = class.session(&polite);
    let mut high = class.session(&impolite);

    low.join(&[impolite.id]).await.unwrap();
    high.join(&[polite.id]).await.unwrap();
    low.poll_once().await.unwrap();

    let replaced = polite.factory.connections_to(&impolite.id)[0].clone();
    replaced.emit_state(LinkState::Closed).await;
    low.process_pending_events().await.unwrap();

    assert_eq!(
        low.peer_state(&impolite.id),
        Some(PeerState::RemoteDescriptionSet),
        "the replaced connection closing does not end the new negotiation"
    );
}

#[tokio::test]
async fn test_departed_peer_drops_its_queued_signals() {
    init_tracing();

    let class = TestClass::new();
    let a = class.member();
    let b = class.member();
    let flaky = FlakyTransport::new(a.transport.clone());
    let mut alice = class.session_over(&a, flaky.clone());

    flaky.fail_sends(ClientError::TransientNetworkFailure("timeout".into()), 1);
    assert_eq!(alice.join(&[b.id]).await.unwrap(), 1);
    assert_eq!(alice.queued_signals(), 1);

    let conn = a.factory.latest(&b.id).unwrap();
    conn.emit_state(LinkState::Failed).await;
    alice.process_pending_events().await.unwrap();

    assert!(alice.peer(&b.id).is_none());
    assert_eq!(alice.queued_signals(), 0);

    alice.poll_once().await.unwrap();
    assert_eq!(class.pending().await, 0, "nothing sent to the departed peer");
}
