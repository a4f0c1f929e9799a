//! Runs sharing one orchestrator concurrently.

use super::support::{SteppingClock, config, workspace_root};
use crate::release::{
    adapters::memory::{
        InMemoryTaskStore, Notification, RecordingNotificationChannel, ScriptedCommandRunner,
        StaticCapability, StaticSourceFetcher,
    },
    domain::{
        BranchName, NewTask, Platform, PlatformType, PreviewId, RunStatus, Task, TaskId, UserId,
        VersionLabel,
    },
    ports::{PlatformCapability, TaskStore},
    services::{
        OrchestratorPorts, PlatformDispatcher, PreviewRunRequest, PublishRequest,
        TaskOrchestrator,
    },
};
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::time::Duration;

type Orchestrator = TaskOrchestrator<
    InMemoryTaskStore,
    RecordingNotificationChannel,
    StaticSourceFetcher,
    ScriptedCommandRunner,
    SteppingClock,
>;

struct Shared {
    store: Arc<InMemoryTaskStore>,
    notifier: Arc<RecordingNotificationChannel>,
    orchestrator: Orchestrator,
}

#[fixture]
fn shared() -> Shared {
    let store = Arc::new(InMemoryTaskStore::new());
    let notifier = Arc::new(RecordingNotificationChannel::new());
    let capability: Arc<dyn PlatformCapability> =
        Arc::new(StaticCapability::succeeding("https://qr.example/shared"));
    let dispatcher = Platform::ALL.into_iter().fold(
        PlatformDispatcher::new(),
        |dispatcher, platform| dispatcher.with_capability(platform, Arc::clone(&capability)),
    );
    let orchestrator = TaskOrchestrator::new(
        OrchestratorPorts {
            store: Arc::clone(&store),
            notifier: Arc::clone(&notifier),
            fetcher: Arc::new(StaticSourceFetcher::new().with_delay(Duration::from_millis(20))),
            runner: Arc::new(ScriptedCommandRunner::new()),
            dispatcher,
        },
        Arc::new(SteppingClock::standard()),
        Arc::new(config(workspace_root())),
    );
    Shared {
        store,
        notifier,
        orchestrator,
    }
}

fn publish_request(version: &str) -> PublishRequest {
    PublishRequest::new(NewTask {
        platform_type: PlatformType::new("wechat-mini").expect("valid platform type"),
        version: VersionLabel::new(version).expect("valid version"),
        branch: BranchName::new("main").expect("valid branch"),
        description: String::new(),
        owner: UserId::new("alice").expect("valid user"),
    })
}

async fn stored(store: &InMemoryTaskStore, id: TaskId) -> Task {
    let persisted = store.get(id).await.expect("task is stored");
    Task::from_persisted(persisted).expect("stored task is valid")
}

/// Journal lengths of every task snapshot pushed for `id`, in push order.
fn pushed_journal_lengths(notifier: &RecordingNotificationChannel, id: TaskId) -> Vec<usize> {
    notifier
        .notifications()
        .into_iter()
        .filter_map(|notification| match notification {
            Notification::TaskCreated(task) | Notification::TaskUpdated(task)
                if task.id() == id =>
            {
                Some(task.journal().len())
            }
            _ => None,
        })
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_publishes_keep_separate_journals(shared: Shared) {
    let (first, second) = tokio::join!(
        shared.orchestrator.publish(publish_request("1.0")),
        shared.orchestrator.publish(publish_request("2.0")),
    );
    let first = first.expect("first task should be created");
    let second = second.expect("second task should be created");
    assert_ne!(first, second);

    for (id, version) in [(first, "1.0"), (second, "2.0")] {
        let task = stored(&shared.store, id).await;
        assert_eq!(task.status(), RunStatus::Success);
        assert_eq!(task.version().as_str(), version);
        assert_eq!(task.journal().len(), 4);
        assert_eq!(pushed_journal_lengths(&shared.notifier, id), vec![1, 2, 3, 4]);
    }
    assert_eq!(shared.store.task_count().expect("store readable"), 2);
    assert_eq!(shared.notifier.confirmation_count(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn preview_alongside_publish_does_not_touch_the_task(shared: Shared) {
    let preview_request = PreviewRunRequest::new(
        PreviewId::new("preview-9").expect("valid id"),
        UserId::new("bob").expect("valid user"),
        PlatformType::new("wechat-mini").expect("valid platform type"),
        BranchName::new("feature/cart").expect("valid branch"),
    );

    let (published, preview) = tokio::join!(
        shared.orchestrator.publish(publish_request("3.0")),
        shared.orchestrator.preview(preview_request),
    );
    let id = published.expect("task should be created");

    let task = stored(&shared.store, id).await;
    assert_eq!(task.status(), RunStatus::Success);
    assert_eq!(task.journal().len(), 4);
    assert_eq!(pushed_journal_lengths(&shared.notifier, id), vec![1, 2, 3, 4]);

    assert_eq!(preview.status(), RunStatus::Success);
    assert_eq!(preview.journal().len(), 4);
    let preview_lengths: Vec<_> = shared
        .notifier
        .preview_updates()
        .iter()
        .map(|pushed| pushed.journal().len())
        .collect();
    assert_eq!(preview_lengths, vec![1, 2, 3, 4]);
    assert_eq!(shared.store.task_count().expect("store readable"), 1);
}
