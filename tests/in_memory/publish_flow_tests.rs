//! Publish runs driven end to end through in-memory ports and the shell
//! capability adapter.

use super::helpers::{RunHarness, config, publish_request, workspace_root};
use camino::Utf8PathBuf;
use miniship::release::adapters::memory::{Notification, ScriptedCommandRunner};
use miniship::release::domain::RunStatus;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn publish_uploads_and_confirms(workspace_root: Utf8PathBuf) {
    let harness = RunHarness::new(config(workspace_root), ScriptedCommandRunner::new());

    let id = harness
        .orchestrator
        .publish(publish_request("wechat-mini", "main").expect("valid request"))
        .await
        .expect("task should be created");

    let task = harness.stored(id).await.expect("task is stored");
    assert_eq!(task.status(), RunStatus::Success);
    assert_eq!(
        task.qr_code_url(),
        Some("https://qr.example/wechat-mini/1.0")
    );
    assert_eq!(task.journal().len(), 4);

    let notifications = harness.notifier.notifications();
    assert!(matches!(notifications.first(), Some(Notification::TaskCreated(_))));
    assert!(matches!(
        notifications.last(),
        Some(Notification::RunConfirmed { user_id, .. }) if user_id.as_str() == "alice"
    ));
    let last_update = harness
        .notifier
        .task_updates()
        .pop()
        .expect("at least one update");
    assert_eq!(last_update, task);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_dependency_install_is_recorded(workspace_root: Utf8PathBuf) {
    let runner = ScriptedCommandRunner::new().failing_on("npm install", "registry timeout");
    let harness = RunHarness::new(config(workspace_root), runner);

    let id = harness
        .orchestrator
        .publish(publish_request("alipay-mini", "release").expect("valid request"))
        .await
        .expect("task should be created");

    let task = harness.stored(id).await.expect("task is stored");
    assert_eq!(task.status(), RunStatus::Failed);
    assert_eq!(task.journal().len(), 3);
    assert_eq!(
        task.error_message(),
        Some("`npm install` exited with status 1: registry timeout")
    );
    assert_eq!(harness.runner.executed(), vec!["npm install"]);
    assert_eq!(harness.notifier.confirmation_count(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_target_fails_at_preparation(workspace_root: Utf8PathBuf) {
    let harness = RunHarness::new(config(workspace_root), ScriptedCommandRunner::new());

    let id = harness
        .orchestrator
        .publish(publish_request("toutiao-mini", "main").expect("valid request"))
        .await
        .expect("task should be created");

    let task = harness.stored(id).await.expect("task is stored");
    assert_eq!(task.status(), RunStatus::Failed);
    assert_eq!(
        task.error_message(),
        Some("no target configured for mini-program type toutiao-mini")
    );
    assert!(harness.runner.executed().is_empty());
}
