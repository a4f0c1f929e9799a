//! Shared harness for in-memory run integration tests.

use camino::Utf8PathBuf;
use eyre::{Result, WrapErr, eyre};
use miniship::config::{CiConfig, PlatformCommandConfig, TargetConfig};
use miniship::release::{
    adapters::{
        memory::{
            InMemoryTaskStore, RecordingNotificationChannel, ScriptedCommandRunner,
            StaticSourceFetcher,
        },
        process::{CommandCapability, ShellCommandRunner},
    },
    domain::{BranchName, NewTask, Platform, PlatformType, Task, TaskId, UserId, VersionLabel},
    ports::TaskStore,
    services::{OrchestratorPorts, PlatformDispatcher, PublishRequest, TaskOrchestrator},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Orchestrator wired to in-memory ports and a scripted build runner.
pub type TestOrchestrator = TaskOrchestrator<
    InMemoryTaskStore,
    RecordingNotificationChannel,
    StaticSourceFetcher,
    ScriptedCommandRunner,
    DefaultClock,
>;

/// Upload template that prints progress, then the QR code URL.
pub const UPLOAD_COMMAND: &str =
    "echo uploading {{ version }}; echo https://qr.example/{{ platform_type }}/{{ version }}";

/// Preview template that writes a fake JPEG to the requested path.
pub const PREVIEW_COMMAND: &str = "printf 'jpeg' > {{ qr_code_path }}";

/// Collaborators and orchestrator of one test run.
pub struct RunHarness {
    pub store: Arc<InMemoryTaskStore>,
    pub notifier: Arc<RecordingNotificationChannel>,
    pub runner: Arc<ScriptedCommandRunner>,
    pub orchestrator: TestOrchestrator,
}

impl RunHarness {
    /// Builds a harness whose capabilities run the vendor templates through
    /// a real shell.
    pub fn new(config: CiConfig, runner: ScriptedCommandRunner) -> Self {
        let store = Arc::new(InMemoryTaskStore::new());
        let notifier = Arc::new(RecordingNotificationChannel::new());
        let runner = Arc::new(runner);
        let shell = Arc::new(ShellCommandRunner::new());
        let dispatcher = config.platforms.iter().fold(
            PlatformDispatcher::new(),
            |dispatcher, (platform, commands)| {
                dispatcher.with_capability(
                    *platform,
                    Arc::new(CommandCapability::new(Arc::clone(&shell), commands.clone())),
                )
            },
        );
        let orchestrator = TaskOrchestrator::new(
            OrchestratorPorts {
                store: Arc::clone(&store),
                notifier: Arc::clone(&notifier),
                fetcher: Arc::new(StaticSourceFetcher::new()),
                runner: Arc::clone(&runner),
                dispatcher,
            },
            Arc::new(DefaultClock),
            Arc::new(config),
        );
        Self {
            store,
            notifier,
            runner,
            orchestrator,
        }
    }

    /// Loads the stored copy of a task.
    ///
    /// # Errors
    ///
    /// Returns an error when the task is missing or invalid.
    pub async fn stored(&self, id: TaskId) -> Result<Task> {
        let persisted = self.store.get(id).await.wrap_err("load stored task")?;
        Task::from_persisted(persisted).map_err(|err| eyre!("stored task is invalid: {err}"))
    }
}

/// Provides a unique workspace root under the system temp dir.
#[fixture]
pub fn workspace_root() -> Utf8PathBuf {
    let base = Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .unwrap_or_else(|path| Utf8PathBuf::from(path.to_string_lossy().into_owned()));
    base.join("miniship-it").join(uuid::Uuid::new_v4().to_string())
}

/// Configuration with a `WeChat` and an Alipay target.
pub fn config(workspace_root: Utf8PathBuf) -> CiConfig {
    let commands = PlatformCommandConfig {
        upload_command: UPLOAD_COMMAND.to_owned(),
        preview_command: PREVIEW_COMMAND.to_owned(),
    };
    CiConfig::new(workspace_root)
        .with_target(
            "wechat-mini",
            TargetConfig::new("https://github.com/acme/wechat-mini.git", "npm run build:weapp"),
        )
        .with_target(
            "alipay-mini",
            TargetConfig::new(
                "https://git.acme.dev/api/v4/projects/7/repository/archive",
                "npm run build:alipay",
            )
            .with_private_token("secret"),
        )
        .with_platform(Platform::Wechat, commands.clone())
        .with_platform(Platform::Alipay, commands)
}

/// Builds a publish request for `platform_type` at version `1.0`.
///
/// # Errors
///
/// Returns an error when a field fails validation.
pub fn publish_request(platform_type: &str, branch: &str) -> Result<PublishRequest> {
    Ok(PublishRequest::new(NewTask {
        platform_type: PlatformType::new(platform_type).wrap_err("platform type")?,
        version: VersionLabel::new("1.0").wrap_err("version")?,
        branch: BranchName::new(branch).wrap_err("branch")?,
        description: "integration release".to_owned(),
        owner: UserId::new("alice").wrap_err("owner")?,
    }))
}
