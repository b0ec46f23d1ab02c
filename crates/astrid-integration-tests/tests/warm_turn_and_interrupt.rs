//! End-to-end scenario 1 (spec §8), the parts reachable without a worker
//! that actually speaks the IPC protocol: a first message spawns a
//! worker and queues cleanly, a second message arriving while the first
//! is still in flight queues rather than erroring, and the 🛑-equivalent
//! reaction interrupts the queue.

mod common;

use common::Harness;

#[tokio::test]
async fn a_message_spawns_a_worker_and_a_second_message_queues_behind_it() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    harness
        .host
        .handle_inbound("telegram", "acme", "m1", "alice", None, "@assistant hi", "hi")
        .await
        .expect("first message spawns the worker and enqueues cleanly");

    harness
        .host
        .handle_inbound("telegram", "acme", "m2", "alice", None, "@assistant are you there", "are you there")
        .await
        .expect("second message queues behind the in-flight turn instead of erroring");
}

#[tokio::test]
async fn an_interrupt_reaction_on_an_unknown_workspace_is_an_error() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    // No workspace registered for "acme" here.
    let result = harness.host.handle_reaction("acme", "✗").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn a_recheck_reaction_is_a_no_op() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    harness.host.handle_reaction("acme", "👀").await.expect("recheck has no side effect");
    assert!(harness.channel.sent().is_empty());
}

#[tokio::test]
async fn an_interrupt_reaction_on_a_live_workspace_drops_its_queue() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    harness.host.handle_inbound("telegram", "acme", "m1", "alice", None, "@assistant hi", "hi").await.unwrap();

    harness.host.handle_reaction("acme", "✗").await.expect("interrupt on a live workspace succeeds");
}
