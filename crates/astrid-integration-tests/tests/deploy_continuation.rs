//! End-to-end scenario 6 (spec §8): a chat-triggered redeploy writes a
//! continuation, shuts the host down, and the next startup replays it.

mod common;

use std::time::Duration;

use astrid_core::{Session, SessionToken, WorkspaceFolder};
use common::Harness;

#[tokio::test]
async fn redeploy_notifies_the_chat_and_the_restarted_host_resumes_it() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    let folder = WorkspaceFolder("acme".to_string());
    harness.host.store().sessions.put(&Session::new(folder.clone(), SessionToken("tok-1".to_string()))).await.unwrap();

    harness
        .host
        .redeploy("acme", "def456", "abc123", "Deploy complete. Verifying service health.")
        .await
        .expect("redeploy writes its continuation and notifies before shutting down");

    let deploying_notice = harness.channel.sent();
    assert_eq!(deploying_notice.len(), 1);
    assert!(deploying_notice[0].1.starts_with("Deploying def456"), "{}", deploying_notice[0].1);

    // A fresh host over the same data root should replay the
    // continuation on `run`, resuming the session and notifying the chat,
    // before it's told to shut down in turn.
    let (host2, channel2) = harness.reopen(vec!["acme".to_string()]).await;
    let run_handle = tokio::spawn({
        let host2 = host2.clone();
        async move { host2.run().await }
    });

    let resumed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if !channel2.sent().is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(resumed.is_ok(), "the restarted host should publish a resume notice");

    let sent = channel2.sent();
    assert_eq!(sent[0].0, "acme");
    assert_eq!(sent[0].1, "Deploy complete. Verifying service health.");

    let restored = host2.store().sessions.get(&folder).await.unwrap();
    assert_eq!(restored.map(|s| s.token.0), Some("tok-1".to_string()));

    host2.trigger_shutdown();
    tokio::time::timeout(Duration::from_secs(5), run_handle).await.expect("run() returns after shutdown").unwrap().unwrap();
}
