//! Shared world state for publish run BDD scenarios.

use std::sync::Arc;

use camino::Utf8PathBuf;
use miniship::config::{CiConfig, TargetConfig};
use miniship::release::{
    adapters::memory::{
        InMemoryTaskStore, RecordingNotificationChannel, ScriptedCommandRunner,
        StaticCapability, StaticSourceFetcher,
    },
    domain::{Platform, Task},
    services::{OrchestratorPorts, PlatformDispatcher, TaskOrchestrator},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Orchestrator type used by the BDD world.
pub type TestOrchestrator = TaskOrchestrator<
    InMemoryTaskStore,
    RecordingNotificationChannel,
    StaticSourceFetcher,
    ScriptedCommandRunner,
    DefaultClock,
>;

/// Scenario world for publish run behaviour tests.
pub struct PublishWorld {
    pub config: CiConfig,
    pub runner: ScriptedCommandRunner,
    pub store: Arc<InMemoryTaskStore>,
    pub notifier: Arc<RecordingNotificationChannel>,
    pub last_task: Option<Task>,
}

impl PublishWorld {
    /// Creates a world with an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        let root = Utf8PathBuf::from_path_buf(std::env::temp_dir())
            .unwrap_or_else(|path| Utf8PathBuf::from(path.to_string_lossy().into_owned()))
            .join("miniship-bdd")
            .join(uuid::Uuid::new_v4().to_string());
        Self {
            config: CiConfig::new(root),
            runner: ScriptedCommandRunner::new(),
            store: Arc::new(InMemoryTaskStore::new()),
            notifier: Arc::new(RecordingNotificationChannel::new()),
            last_task: None,
        }
    }

    /// Adds a target fetched from a GitHub repository.
    pub fn add_target(&mut self, platform_type: &str, build_command: &str) {
        let location = format!("https://github.com/acme/{platform_type}.git");
        self.config = self.config.clone().with_target(
            platform_type,
            TargetConfig::new(location, build_command),
        );
    }

    /// Wires an orchestrator from the scenario's current state.
    #[must_use]
    pub fn orchestrator(&self) -> TestOrchestrator {
        let capability = Arc::new(StaticCapability::succeeding("https://qr.example/bdd"));
        let dispatcher = Platform::ALL.into_iter().fold(
            PlatformDispatcher::new(),
            |dispatcher, platform| {
                dispatcher.with_capability(platform, Arc::clone(&capability) as _)
            },
        );
        TaskOrchestrator::new(
            OrchestratorPorts {
                store: Arc::clone(&self.store),
                notifier: Arc::clone(&self.notifier),
                fetcher: Arc::new(StaticSourceFetcher::new()),
                runner: Arc::new(self.runner.clone()),
                dispatcher,
            },
            Arc::new(DefaultClock),
            Arc::new(self.config.clone()),
        )
    }
}

impl Default for PublishWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PublishWorld {
    PublishWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
