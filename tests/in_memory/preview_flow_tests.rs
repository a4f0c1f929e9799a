//! Preview runs driven end to end through the shell capability adapter.

use super::helpers::{RunHarness, config, workspace_root};
use camino::Utf8PathBuf;
use miniship::release::adapters::memory::ScriptedCommandRunner;
use miniship::release::domain::{BranchName, PlatformType, PreviewId, RunStatus, UserId};
use miniship::release::services::PreviewRunRequest;
use rstest::rstest;

fn preview_request(platform_type: &str) -> PreviewRunRequest {
    PreviewRunRequest::new(
        PreviewId::new("preview-1").expect("valid id"),
        UserId::new("bob").expect("valid user"),
        PlatformType::new(platform_type).expect("valid platform type"),
        BranchName::new("feature/cart").expect("valid branch"),
    )
    .with_scene("1011")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn preview_pushes_every_transition_and_embeds_the_image(workspace_root: Utf8PathBuf) {
    let harness = RunHarness::new(config(workspace_root), ScriptedCommandRunner::new());

    let preview = harness.orchestrator.preview(preview_request("wechat-mini")).await;

    assert_eq!(preview.status(), RunStatus::Success);
    assert_eq!(preview.qr_code(), Some("data:image/jpeg;base64,anBlZw=="));
    let pushed = harness.notifier.preview_updates();
    let lengths: Vec<_> = pushed.iter().map(|update| update.journal().len()).collect();
    assert_eq!(lengths, vec![1, 2, 3, 4]);
    assert_eq!(harness.store.task_count().expect("store readable"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn preview_of_unregistered_platform_fails(workspace_root: Utf8PathBuf) {
    let config = config(workspace_root).with_target(
        "toutiao-mini",
        miniship::config::TargetConfig::new("https://github.com/acme/tt", "npm run build:tt"),
    );
    let harness = RunHarness::new(config, ScriptedCommandRunner::new());

    let preview = harness.orchestrator.preview(preview_request("toutiao-mini")).await;

    assert_eq!(preview.status(), RunStatus::Failed);
    assert_eq!(
        preview.error_message(),
        Some("no capability registered for platform toutiao")
    );
    assert_eq!(preview.journal().len(), 2);
    assert_eq!(harness.notifier.preview_updates().len(), 2);
}
