//! End-to-end scenario 2 (spec §8): the `reset` and `end-session` magic
//! commands clear or stop a workspace's session and notify the chat.

mod common;

use astrid_core::{Session, SessionToken, WorkspaceFolder};
use common::Harness;

#[tokio::test]
async fn reset_clears_session_and_history_then_notifies() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    let folder = WorkspaceFolder("acme".to_string());
    harness.host.store().sessions.put(&Session::new(folder.clone(), SessionToken("tok-1".to_string()))).await.unwrap();
    assert!(harness.host.store().sessions.get(&folder).await.unwrap().is_some());

    harness
        .host
        .handle_inbound("telegram", "acme", "m1", "alice", None, "reset", "reset")
        .await
        .expect("reset command handled");

    assert!(harness.host.store().sessions.get(&folder).await.unwrap().is_none(), "reset clears the bound session");

    let sent = harness.channel.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "acme");
    assert!(sent[0].1.contains("reset"), "notice should mention the reset: {}", sent[0].1);
}

#[tokio::test]
async fn end_session_stops_the_worker_but_keeps_the_chat_id() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    harness
        .host
        .handle_inbound("telegram", "acme", "m1", "alice", None, "end-session", "end-session")
        .await
        .expect("end-session command handled");

    let sent = harness.channel.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("ended"), "notice should confirm the session ended: {}", sent[0].1);
}

#[tokio::test]
async fn duplicate_delivery_of_the_same_platform_message_id_is_a_no_op() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    harness.host.handle_inbound("telegram", "acme", "m1", "alice", None, "reset", "reset").await.unwrap();
    harness.host.handle_inbound("telegram", "acme", "m1", "alice", None, "reset", "reset").await.unwrap();

    // The second delivery is recognized as a duplicate by message id and
    // never reaches the magic-command dispatch, so only one notice is sent.
    assert_eq!(harness.channel.sent().len(), 1);
}
