//! Runs a single mini-program publish or preview from the command line.
//!
//! Usage:
//!
//! ```text
//! miniship --config miniship.toml publish --platform-type wechat-mini \
//!     --version 1.0.0 --branch main --owner alice --description "spring sale"
//! miniship --config miniship.toml preview --id p-42 --platform-type alipay-mini \
//!     --branch feature/cart --owner alice --page-path pages/cart/index
//! ```
//!
//! Source transfer, builds and vendor tooling run as child processes; task
//! state lives in memory and notifications are written to the log. The
//! process exits with a failure status when the run fails.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use miniship::config::CiConfig;
use miniship::release::{
    adapters::{
        TracingNotificationChannel,
        memory::InMemoryTaskStore,
        process::{CommandCapability, ProcessSourceFetcher, ShellCommandRunner},
    },
    domain::{
        BranchName, NewTask, PlatformType, PreviewId, RunStatus, Task, UserId, VersionLabel,
    },
    ports::TaskStore,
    services::{
        OrchestratorPorts, PlatformDispatcher, PreviewRunRequest, PublishRequest, TaskOrchestrator,
    },
};
use miniship::telemetry::{self, LogFormat};
use mockable::DefaultClock;
use std::process::ExitCode;
use std::sync::Arc;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Orchestrator = TaskOrchestrator<
    InMemoryTaskStore,
    TracingNotificationChannel,
    ProcessSourceFetcher,
    ShellCommandRunner,
    DefaultClock,
>;

#[derive(Debug, Parser)]
#[command(name = "miniship", version, about = "Publish and preview mini-programs")]
struct Cli {
    /// Path to the TOML run configuration.
    #[arg(long, short, default_value = "miniship.toml")]
    config: Utf8PathBuf,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: RunCommand,
}

#[derive(Debug, Subcommand)]
enum RunCommand {
    /// Build a branch and upload it as a release.
    Publish {
        /// Mini-program type, such as `wechat-mini`.
        #[arg(long)]
        platform_type: String,
        /// Version label of the upload.
        #[arg(long)]
        version: String,
        /// Branch to build.
        #[arg(long)]
        branch: String,
        /// User starting the run.
        #[arg(long)]
        owner: String,
        /// Release description.
        #[arg(long, default_value = "")]
        description: String,
        /// Uploader identity passed to the platform.
        #[arg(long)]
        identification: Option<String>,
        /// Upload as the experience (trial) version.
        #[arg(long)]
        experience: bool,
    },
    /// Build a branch and render a preview QR code.
    Preview {
        /// Preview run identifier.
        #[arg(long)]
        id: String,
        /// Mini-program type, such as `wechat-mini`.
        #[arg(long)]
        platform_type: String,
        /// Branch to build.
        #[arg(long)]
        branch: String,
        /// User starting the run.
        #[arg(long)]
        owner: String,
        /// Page opened by the QR code.
        #[arg(long)]
        page_path: Option<String>,
        /// Query string passed to the page.
        #[arg(long)]
        search_query: Option<String>,
        /// Launch scene.
        #[arg(long)]
        scene: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, BoxError> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level, cli.log_format)?;

    let config = Arc::new(CiConfig::load(&cli.config).await?);
    let store = Arc::new(InMemoryTaskStore::new());
    let orchestrator = build_orchestrator(Arc::clone(&store), config);

    let status = match cli.command {
        RunCommand::Publish {
            platform_type,
            version,
            branch,
            owner,
            description,
            identification,
            experience,
        } => {
            let task = NewTask {
                platform_type: PlatformType::new(platform_type)?,
                version: VersionLabel::new(version)?,
                branch: BranchName::new(branch)?,
                description,
                owner: UserId::new(owner)?,
            };
            let mut request = PublishRequest::new(task);
            if let Some(identification) = identification {
                request = request.with_identification(identification);
            }
            if experience {
                request = request.as_experience();
            }
            publish(&orchestrator, store.as_ref(), request).await?
        }
        RunCommand::Preview {
            id,
            platform_type,
            branch,
            owner,
            page_path,
            search_query,
            scene,
        } => {
            let mut request = PreviewRunRequest::new(
                PreviewId::new(id)?,
                UserId::new(owner)?,
                PlatformType::new(platform_type)?,
                BranchName::new(branch)?,
            );
            if let Some(page_path) = page_path {
                request = request.with_page_path(page_path);
            }
            if let Some(search_query) = search_query {
                request = request.with_search_query(search_query);
            }
            if let Some(scene) = scene {
                request = request.with_scene(scene);
            }
            orchestrator.preview(request).await.status()
        }
    };

    Ok(if status == RunStatus::Success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn build_orchestrator(store: Arc<InMemoryTaskStore>, config: Arc<CiConfig>) -> Orchestrator {
    let runner = Arc::new(ShellCommandRunner::new());
    let dispatcher = config
        .platforms
        .iter()
        .fold(PlatformDispatcher::new(), |dispatcher, (platform, commands)| {
            dispatcher.with_capability(
                *platform,
                Arc::new(CommandCapability::new(Arc::clone(&runner), commands.clone())),
            )
        });
    let ports = OrchestratorPorts {
        store,
        notifier: Arc::new(TracingNotificationChannel::new()),
        fetcher: Arc::new(ProcessSourceFetcher::new(Arc::clone(&runner))),
        runner,
        dispatcher,
    };
    TaskOrchestrator::new(ports, Arc::new(DefaultClock), config)
}

async fn publish(
    orchestrator: &Orchestrator,
    store: &InMemoryTaskStore,
    request: PublishRequest,
) -> Result<RunStatus, BoxError> {
    let Some(id) = orchestrator.publish(request).await else {
        return Ok(RunStatus::Failed);
    };
    let task = Task::from_persisted(store.get(id).await?)?;
    Ok(task.status())
}
