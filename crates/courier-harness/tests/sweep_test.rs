//! Garbage-collection sweep behavior on the virtual clock.

use std::time::Duration;

use courier_client::Identity;
use courier_core::Store;
use courier_harness::{TestEnv, TestRelay, test_relay};

async fn register(relay: &TestRelay, env: &TestEnv, name: &str) -> Identity {
    let identity = Identity::from_seed(env.seed_bytes());
    relay
        .enter(name, &identity.armored_public_key())
        .await
        .expect("registration should succeed");
    identity
}

async fn deliver_and_collect(relay: &TestRelay, alice: &Identity, bob: &Identity, body: &str) {
    let sealed = relay.send("alice", "bob", body).await.expect("send");
    relay
        .confirm_send(&alice.decrypt_challenge(&sealed).expect("decrypt"))
        .expect("confirm");
    let deliveries = relay.retrieve("bob").await.expect("retrieve");
    let delivery = deliveries.iter().find(|d| d.body == body).expect("delivered");
    let token = bob.decrypt_challenge(&delivery.encrypted_challenge).expect("decrypt");
    relay.confirm_collect(&token).expect("collect");
}

#[tokio::test]
async fn collected_messages_are_swept_after_the_grace_period() {
    let (env, relay) = test_relay(21);
    let alice = register(&relay, &env, "alice").await;
    let bob = register(&relay, &env, "bob").await;

    deliver_and_collect(&relay, &alice, &bob, "hi").await;
    assert_eq!(relay.store().message_count(), 1);

    // Within the grace period the record lingers.
    env.advance(500);
    assert_eq!(relay.sweep(Duration::from_secs(1)), 0);
    assert_eq!(relay.store().message_count(), 1);

    // Past it, the sweep removes the record.
    env.advance(600);
    assert_eq!(relay.sweep(Duration::from_secs(1)), 1);
    assert_eq!(relay.store().message_count(), 0);
}

#[tokio::test]
async fn zero_grace_sweeps_immediately() {
    let (env, relay) = test_relay(22);
    let alice = register(&relay, &env, "alice").await;
    let bob = register(&relay, &env, "bob").await;

    deliver_and_collect(&relay, &alice, &bob, "hi").await;

    assert_eq!(relay.sweep(Duration::ZERO), 1);
    assert_eq!(relay.store().message_count(), 0);
}

#[tokio::test]
async fn sweep_spares_queued_and_deliverable_messages() {
    let (env, relay) = test_relay(23);
    let alice = register(&relay, &env, "alice").await;
    register(&relay, &env, "bob").await;

    // One message stays queued, one becomes deliverable, one is collected.
    relay.send("alice", "bob", "queued").await.expect("send");

    let sealed = relay.send("alice", "bob", "deliverable").await.expect("send");
    relay
        .confirm_send(&alice.decrypt_challenge(&sealed).expect("decrypt"))
        .expect("confirm");

    let deliveries = relay.retrieve("bob").await.expect("retrieve");
    assert_eq!(deliveries.len(), 1);

    env.advance(10_000);
    assert_eq!(relay.sweep(Duration::ZERO), 0, "nothing collected, nothing swept");
    assert_eq!(relay.store().message_count(), 2);
}
