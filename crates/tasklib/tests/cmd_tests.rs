//! CmdTask tests against real `sh` subprocesses.

use serde_json::json;

use arbor_tasklib::{CmdConfig, CmdTask};
use arbor_tree::{Blackboard, Node, Status};

#[tokio::test]
async fn echo_succeeds_and_captures_stdout() {
    let task = CmdTask::new("echo hello");
    let data = Blackboard::new();

    let status = task.update(data.clone()).await.expect("update should not error");
    assert_eq!(status, Status::Succeeded);
    assert_eq!(data.get("cmd"), Some(json!("echo hello")));
    assert_eq!(data.get("stdout"), Some(json!("hello\n")));
    assert_eq!(data.get("stderr"), Some(json!("")));
    assert_eq!(data.get("exit_code"), Some(json!(0)));
}

#[tokio::test]
async fn stderr_is_captured() {
    let task = CmdTask::new("echo oops 1>&2");
    let data = Blackboard::new();

    let status = task.update(data.clone()).await.expect("update should not error");
    assert_eq!(status, Status::Succeeded);
    assert_eq!(data.get("stderr"), Some(json!("oops\n")));
}

#[tokio::test]
async fn nonzero_exit_fails() {
    let task = CmdTask::new("false");
    let data = Blackboard::new();

    let status = task.update(data.clone()).await.expect("update should not error");
    assert_eq!(status, Status::Failed);
    assert_eq!(data.get("exit_code"), Some(json!(1)));
}

#[tokio::test]
async fn missing_binary_fails_via_shell() {
    let task = CmdTask::new("definitely-not-a-real-binary-1234");
    let data = Blackboard::new();

    // sh reports 127 for command-not-found; that is a task failure, not an
    // update error.
    let status = task.update(data.clone()).await.expect("update should not error");
    assert_eq!(status, Status::Failed);
    assert_eq!(data.get("exit_code"), Some(json!(127)));
}

#[tokio::test]
async fn timeout_surfaces_as_error() {
    let task = CmdTask::with_config(CmdConfig {
        cmd: "sleep 5".to_string(),
        name: None,
        timeout_secs: Some(1),
    });

    let err = task
        .update(Blackboard::new())
        .await
        .expect_err("timeout should error");
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn timed_out_child_is_killed() {
    let dir = tempfile::tempdir().expect("temp dir");
    let marker = dir.path().join("survived");
    let task = CmdTask::with_config(CmdConfig {
        cmd: format!("sleep 2 && touch {}", marker.display()),
        name: None,
        timeout_secs: Some(1),
    });

    task.update(Blackboard::new())
        .await
        .expect_err("timeout should error");

    // Long enough for the shell to have touched the marker had it
    // outlived the timeout.
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    assert!(!marker.exists(), "timed-out child kept running");
}

#[tokio::test]
async fn tick_records_command_failure() {
    let task = CmdTask::new("exit 3");
    let scratch = Blackboard::new();

    assert_eq!(task.tick(scratch.clone()).await, Status::Failed);

    let record = scratch.board(task.meta().id());
    assert_eq!(record.get("status"), Some(json!("failed")));
    assert_eq!(record.board("data").get("exit_code"), Some(json!(3)));
}
