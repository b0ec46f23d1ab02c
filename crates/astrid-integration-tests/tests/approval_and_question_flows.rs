//! End-to-end scenarios 3 and 4 (spec §8): a worker escalation blocked on
//! a human decision, resolved via the `approve`/`deny` chat commands, plus
//! the `ask_user` cold-path answer flow.

mod common;

use astrid_approval::{ApprovalDecision, ApprovalManager, AwaitOutcome, HandlerType, PendingApproval, PendingQuestion, QuestionManager};
use astrid_core::{Question, RequestId, SessionToken};
use astrid_workspace::WorkspaceLayout;
use common::Harness;

#[tokio::test]
async fn approve_writes_a_decision_and_notifies_the_chat() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    let layout = WorkspaceLayout::new(harness.data_root.clone());
    let approvals = ApprovalManager::new(layout.ipc_root());
    let approval = PendingApproval::new(
        RequestId::new(),
        "post_message",
        "acme",
        "acme",
        serde_json::json!({"channel": "#general", "text": "shipped"}),
        HandlerType::Service,
    );
    approvals.create(&approval).await.expect("write pending approval");
    let short_id = approval.short_id();

    harness
        .host
        .handle_inbound("telegram", "acme", "m1", "alice", None, &format!("approve {short_id}"), &format!("approve {short_id}"))
        .await
        .expect("approve command handled");

    let outcome = approvals
        .await_decision("acme", &approval.request_id, std::time::Duration::from_millis(50))
        .await
        .expect("decision readable");
    assert_eq!(outcome, AwaitOutcome::Decided(ApprovalDecision::Approve));

    let sent = harness.channel.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains(&short_id), "notice should echo the short id: {}", sent[0].1);
    assert!(sent[0].1.starts_with("Approved"));
}

#[tokio::test]
async fn deny_records_a_reason_the_worker_would_see() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    let layout = WorkspaceLayout::new(harness.data_root.clone());
    let approvals = ApprovalManager::new(layout.ipc_root());
    let approval = PendingApproval::new(
        RequestId::new(),
        "run_bash",
        "acme",
        "acme",
        serde_json::json!({"command": "curl example.com"}),
        HandlerType::Service,
    );
    approvals.create(&approval).await.unwrap();
    let short_id = approval.short_id();

    harness
        .host
        .handle_inbound("telegram", "acme", "m1", "alice", None, &format!("deny {short_id}"), &format!("deny {short_id}"))
        .await
        .expect("deny command handled");

    let outcome =
        approvals.await_decision("acme", &approval.request_id, std::time::Duration::from_millis(50)).await.expect("decision readable");
    match outcome {
        AwaitOutcome::Decided(ApprovalDecision::Deny { reason }) => assert_eq!(reason, "Denied by user"),
        other => panic!("expected a denial, got {other:?}"),
    }

    assert!(harness.channel.sent()[0].1.starts_with("Denied"));
}

#[tokio::test]
async fn an_unknown_short_id_surfaces_as_an_error_rather_than_silently_succeeding() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    let result = harness.host.handle_inbound("telegram", "acme", "m1", "alice", None, "approve deadbeef", "approve deadbeef").await;
    assert!(result.is_err(), "approving a non-existent short id must not be treated as success");
}

#[tokio::test]
async fn pending_list_reports_every_outstanding_approval_for_the_workspace() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    let layout = WorkspaceLayout::new(harness.data_root.clone());
    let approvals = ApprovalManager::new(layout.ipc_root());
    let approval =
        PendingApproval::new(RequestId::new(), "post_message", "acme", "acme", serde_json::json!({}), HandlerType::Service);
    approvals.create(&approval).await.unwrap();

    harness.host.handle_inbound("telegram", "acme", "m1", "alice", None, "pending", "pending").await.expect("pending list handled");

    let sent = harness.channel.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains(&approval.request_id.to_string()) || sent[0].1.contains("Pending approvals"));
}

#[tokio::test]
async fn cold_path_answer_re_enqueues_the_qa_as_context_once_the_worker_is_gone() {
    let harness = Harness::new(vec!["acme".to_string()]).await;
    harness.register_workspace("acme").await;

    let layout = WorkspaceLayout::new(harness.data_root.clone());
    let questions = QuestionManager::new(layout.ipc_root());
    let pending = PendingQuestion::new(
        RequestId::new(),
        "acme",
        "acme",
        "telegram",
        SessionToken("tok-gone".to_string()),
        vec![Question { text: "Deploy to prod?".to_string(), options: Some(vec!["yes".to_string(), "no".to_string()]) }],
    );
    questions.create(&pending).await.expect("write pending question");

    // No live session exists for `acme`, so this must take the cold path:
    // clear the question and enqueue a context message rather than write
    // an IPC response nobody will read.
    harness.host.answer_question("acme", vec!["yes".to_string()]).await.expect("cold-path answer handled");

    assert!(questions.get("acme", &pending.request_id).await.is_err(), "the cold path clears the pending question");
}
