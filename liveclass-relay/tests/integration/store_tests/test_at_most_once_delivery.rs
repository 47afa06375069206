use liveclass_relay::SignalStore;
use std::collections::HashSet;

use crate::integration::init_tracing;
use crate::utils::TestRelay;

#[tokio::test]
async fn test_each_message_is_delivered_in_exactly_one_poll() {
    init_tracing();

    let relay = TestRelay::new();
    let alice = relay.participant("alice");
    let bob = relay.participant("bob");

    let mut sent = HashSet::new();
    for seq in 0..3 {
        let msg = relay
            .service
            .send(alice.id, relay.candidate_to(&bob, seq))
            .await
            .expect("send should succeed");
        sent.insert(msg.id);
    }

    let first = relay.service.poll(bob.id, relay.class_id).await.unwrap();
    let second = relay.service.poll(bob.id, relay.class_id).await.unwrap();

    let delivered: HashSet<_> = first.iter().map(|m| m.id).collect();
    assert_eq!(delivered, sent, "first poll returns everything queued");
    assert!(second.is_empty(), "nothing is delivered twice");
    assert_eq!(relay.store.pending().await, 0);
}

#[tokio::test]
async fn test_messages_are_only_visible_to_their_receiver() {
    init_tracing();

    let relay = TestRelay::new();
    let alice = relay.participant("alice");
    let bob = relay.participant("bob");
    let carol = relay.participant("carol");

    relay
        .service
        .send(alice.id, relay.offer_to(&bob))
        .await
        .unwrap();

    let for_carol = relay.service.poll(carol.id, relay.class_id).await.unwrap();
    let for_alice = relay.service.poll(alice.id, relay.class_id).await.unwrap();
    assert!(for_carol.is_empty());
    assert!(for_alice.is_empty());

    let for_bob = relay.service.poll(bob.id, relay.class_id).await.unwrap();
    assert_eq!(for_bob.len(), 1);
    assert_eq!(for_bob[0].sender_id, alice.id);
    assert_eq!(for_bob[0].receiver_id, bob.id);
}

#[tokio::test]
async fn test_same_receiver_in_two_classes_has_two_mailboxes() {
    init_tracing();

    let relay = TestRelay::new();
    let alice = relay.participant("alice");
    let bob = relay.participant("bob");

    let other_class = liveclass_core::ClassId::new();
    relay
        .directory
        .insert_class(other_class, vec![alice.id, bob.id]);

    relay
        .service
        .send(alice.id, relay.offer_to(&bob))
        .await
        .unwrap();

    let elsewhere = relay.service.poll(bob.id, other_class).await.unwrap();
    assert!(elsewhere.is_empty());

    let here = relay.service.poll(bob.id, relay.class_id).await.unwrap();
    assert_eq!(here.len(), 1);
}
