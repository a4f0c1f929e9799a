//! End-to-end stage machine for publish and preview runs.

use super::{
    AtStage, BoundedFetcher, BuildRunner, PlatformDispatcher, PreviewArtifactError, StageError,
    StageFailure,
};
use crate::config::{CiConfig, TargetConfig};
use crate::release::{
    domain::{
        BranchName, NewTask, PREVIEW_QR_FILE_NAME, PlatformType, PreviewId, PreviewTask,
        ReleaseDomainError, SourceLocator, Stage, Task, TaskId, UserId, VersionLabel,
    },
    ports::{
        CommandRunner, NotificationChannel, NotificationResult, PlatformCapability,
        PreviewRequest, SourceFetcher, TaskStore, UploadRequest, preview_qr_path,
    },
};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::Clock;
use std::sync::Arc;
use tracing::Instrument;

/// Request to publish a mini-program build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    task: NewTask,
    identification: Option<String>,
    experience: bool,
}

impl PublishRequest {
    /// Creates a request that uploads a regular (non-experience) build.
    #[must_use]
    pub const fn new(task: NewTask) -> Self {
        Self {
            task,
            identification: None,
            experience: false,
        }
    }

    /// Sets the uploader identity passed to the platform.
    #[must_use]
    pub fn with_identification(mut self, identification: impl Into<String>) -> Self {
        self.identification = Some(identification.into());
        self
    }

    /// Marks the upload as the experience (trial) version.
    #[must_use]
    pub const fn as_experience(mut self) -> Self {
        self.experience = true;
        self
    }
}

/// Request to generate a preview QR code for a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRunRequest {
    id: PreviewId,
    owner: UserId,
    platform_type: PlatformType,
    branch: BranchName,
    page_path: Option<String>,
    search_query: Option<String>,
    scene: Option<String>,
}

impl PreviewRunRequest {
    /// Creates a preview request that opens the default page.
    #[must_use]
    pub const fn new(
        id: PreviewId,
        owner: UserId,
        platform_type: PlatformType,
        branch: BranchName,
    ) -> Self {
        Self {
            id,
            owner,
            platform_type,
            branch,
            page_path: None,
            search_query: None,
            scene: None,
        }
    }

    /// Sets the page opened by the QR code.
    #[must_use]
    pub fn with_page_path(mut self, page_path: impl Into<String>) -> Self {
        self.page_path = Some(page_path.into());
        self
    }

    /// Sets the query string passed to the page.
    #[must_use]
    pub fn with_search_query(mut self, search_query: impl Into<String>) -> Self {
        self.search_query = Some(search_query.into());
        self
    }

    /// Sets the launch scene.
    #[must_use]
    pub fn with_scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = Some(scene.into());
        self
    }
}

/// Collaborators injected into a [`TaskOrchestrator`].
pub struct OrchestratorPorts<S, N, F, R> {
    /// Persistent task store.
    pub store: Arc<S>,
    /// Push-notification channel.
    pub notifier: Arc<N>,
    /// Source transfer implementation.
    pub fetcher: Arc<F>,
    /// Shell command runner used for builds.
    pub runner: Arc<R>,
    /// Platform capabilities.
    pub dispatcher: PlatformDispatcher,
}

/// Drives publish and preview runs through their stages.
///
/// Stage errors never escape a run: they end it in the failed state,
/// which is recorded and pushed like any other transition. Publish runs
/// re-read the stored task before every transition and write back the
/// whole record.
pub struct TaskOrchestrator<S, N, F, R, C>
where
    S: TaskStore,
    N: NotificationChannel,
    F: SourceFetcher,
    R: CommandRunner,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    notifier: Arc<N>,
    fetcher: BoundedFetcher<F>,
    builder: BuildRunner<R>,
    dispatcher: PlatformDispatcher,
    clock: Arc<C>,
    config: Arc<CiConfig>,
}

impl<S, N, F, R, C> TaskOrchestrator<S, N, F, R, C>
where
    S: TaskStore,
    N: NotificationChannel,
    F: SourceFetcher,
    R: CommandRunner,
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator; build commands are taken from `config`.
    #[must_use]
    pub fn new(ports: OrchestratorPorts<S, N, F, R>, clock: Arc<C>, config: Arc<CiConfig>) -> Self {
        let builder = BuildRunner::from_config(ports.runner, &config);
        Self {
            store: ports.store,
            notifier: ports.notifier,
            fetcher: BoundedFetcher::new(ports.fetcher),
            builder,
            dispatcher: ports.dispatcher,
            clock,
            config,
        }
    }

    /// Runs a publish to completion.
    ///
    /// Returns the task identifier once the run has ended, whatever its
    /// outcome, or `None` when the task could not be created or read back
    /// from the store.
    pub async fn publish(&self, request: PublishRequest) -> Option<TaskId> {
        let PublishRequest {
            task: fields,
            identification,
            experience,
        } = request;
        let platform_type = fields.platform_type.clone();
        let task = match self.create(&Task::new(fields, &*self.clock)).await {
            Ok(task) => task,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    platform_type = %platform_type,
                    "failed to create publish task"
                );
                return None;
            }
        };
        let id = task.id();
        deliver("task_created", self.notifier.task_created(&task).await);

        let span = tracing::info_span!(
            "publish_run",
            task_id = %id,
            platform_type = %task.platform_type()
        );
        async move {
            match self.drive_publish(id, &task, identification, experience).await {
                Ok(()) => {
                    tracing::info!("publish run succeeded");
                    deliver(
                        "run_confirmed",
                        self.notifier
                            .run_confirmed(task.owner(), task.platform_type())
                            .await,
                    );
                }
                Err(failure) => self.fail_task(id, failure).await,
            }
        }
        .instrument(span)
        .await;

        Some(id)
    }

    /// Runs a preview to completion and returns its final state.
    ///
    /// The run is never stored; every transition is pushed to the owner.
    pub async fn preview(&self, request: PreviewRunRequest) -> PreviewTask {
        let span = tracing::info_span!(
            "preview_run",
            preview_id = %request.id,
            platform_type = %request.platform_type
        );
        async move {
            let clock = &*self.clock;
            let mut preview = PreviewTask::start(request.id.clone(), clock);
            self.push_preview(&request.owner, &preview).await;

            match self.drive_preview(&request, &mut preview).await {
                Ok(()) => tracing::info!("preview run succeeded"),
                Err(failure) => {
                    tracing::error!(stage = %failure.stage, error = %failure.error, "preview run failed");
                    match preview.fail(failure.stage, failure.error.to_string(), clock) {
                        Ok(()) => self.push_preview(&request.owner, &preview).await,
                        Err(err) => tracing::error!(error = %err, "failed to record preview failure"),
                    }
                }
            }
            preview
        }
        .instrument(span)
        .await
    }

    /// Stores a new task and returns the stored copy.
    async fn create(&self, task: &Task) -> Result<Task, StageError> {
        let persisted = task.to_persisted()?;
        let id = self.store.create(&persisted).await?;
        self.load(id).await
    }

    async fn drive_publish(
        &self,
        id: TaskId,
        task: &Task,
        identification: Option<String>,
        experience: bool,
    ) -> Result<(), StageFailure> {
        let prepared = self.prepare(task.platform_type(), task.version(), task.branch())?;

        self.fetch(&prepared).await?;
        self.complete_stage(id, Stage::Fetching).await?;

        self.build(task.platform_type(), &prepared.project_path)
            .await?;
        self.complete_stage(id, Stage::Building).await?;

        let upload = UploadRequest {
            platform_type: task.platform_type().clone(),
            project_path: prepared.project_path,
            version: task.version().clone(),
            description: task.description().to_owned(),
            identification,
            experience,
        };
        let qr_code_url = prepared
            .capability
            .upload(&upload)
            .await
            .at(Stage::Uploading)?;

        let clock = &*self.clock;
        self.transition(id, Stage::Uploading, |stored| {
            stored.succeed(Stage::Uploading, Some(qr_code_url), clock)
        })
        .await?;
        tracing::info!(stage = %Stage::Uploading, "stage completed");
        Ok(())
    }

    async fn drive_preview(
        &self,
        request: &PreviewRunRequest,
        preview: &mut PreviewTask,
    ) -> Result<(), StageFailure> {
        let clock = &*self.clock;
        let version = VersionLabel::from_local_time(clock.local());
        let prepared = self.prepare(&request.platform_type, &version, &request.branch)?;

        self.fetch(&prepared).await?;
        preview.record_stage(Stage::Fetching, clock).at(Stage::Fetching)?;
        self.push_preview(&request.owner, preview).await;

        self.build(&request.platform_type, &prepared.project_path)
            .await?;
        preview.record_stage(Stage::Building, clock).at(Stage::Building)?;
        self.push_preview(&request.owner, preview).await;

        let preview_request = PreviewRequest {
            platform_type: request.platform_type.clone(),
            project_path: prepared.project_path.clone(),
            version,
            page_path: request.page_path.clone(),
            search_query: request.search_query.clone(),
            scene: request.scene.clone(),
        };
        prepared
            .capability
            .preview(&preview_request)
            .await
            .at(Stage::Previewing)?;
        let image = read_preview_image(prepared.project_path)
            .await
            .at(Stage::Previewing)?;
        preview
            .succeed(Stage::Previewing, &image, clock)
            .at(Stage::Previewing)?;
        self.push_preview(&request.owner, preview).await;
        Ok(())
    }

    /// Resolves everything a run needs before touching the workspace.
    fn prepare(
        &self,
        platform_type: &PlatformType,
        version: &VersionLabel,
        branch: &BranchName,
    ) -> Result<PreparedRun<'_>, StageFailure> {
        let target = self.config.target(platform_type).at(Stage::Init)?;
        let capability = self
            .dispatcher
            .resolve(platform_type.as_str())
            .at(Stage::Init)?;
        Ok(PreparedRun {
            target,
            capability,
            locator: SourceLocator::derive(
                &target.store_download_path,
                &target.private_token,
                branch,
            ),
            project_path: self.config.project_path(platform_type, version),
        })
    }

    async fn fetch(&self, prepared: &PreparedRun<'_>) -> Result<(), StageFailure> {
        let budget = self.config.fetch_budget(prepared.target);
        tracing::debug!(
            source = %prepared.locator,
            path = %prepared.project_path,
            budget_secs = budget.as_secs(),
            "fetching project source"
        );
        self.fetcher
            .fetch(&prepared.locator, &prepared.project_path, budget)
            .await
            .at(Stage::Fetching)
    }

    async fn build(
        &self,
        platform_type: &PlatformType,
        project_path: &Utf8Path,
    ) -> Result<(), StageFailure> {
        self.builder
            .build(platform_type, project_path)
            .await
            .at(Stage::Building)
    }

    async fn complete_stage(&self, id: TaskId, stage: Stage) -> Result<(), StageFailure> {
        let clock = &*self.clock;
        self.transition(id, stage, |stored| stored.record_stage(stage, clock))
            .await?;
        tracing::info!(stage = %stage, "stage completed");
        Ok(())
    }

    /// Applies one mutation to the latest stored copy of a task, writes it
    /// back and pushes the re-read result.
    async fn transition<M>(&self, id: TaskId, stage: Stage, mutate: M) -> Result<(), StageFailure>
    where
        M: FnOnce(&mut Task) -> Result<(), ReleaseDomainError> + Send,
    {
        let mut stored = self.load(id).await.at(stage)?;
        mutate(&mut stored).at(stage)?;
        let persisted = stored.to_persisted().at(stage)?;
        self.store.update(&persisted).await.at(stage)?;

        let latest = self.load(id).await.at(stage)?;
        deliver("task_updated", self.notifier.task_updated(&latest).await);
        Ok(())
    }

    async fn load(&self, id: TaskId) -> Result<Task, StageError> {
        let persisted = self.store.get(id).await?;
        Ok(Task::from_persisted(persisted)?)
    }

    async fn fail_task(&self, id: TaskId, failure: StageFailure) {
        let StageFailure { stage, error } = failure;
        tracing::error!(stage = %stage, error = %error, "publish run failed");

        let clock = &*self.clock;
        let message = error.to_string();
        let recorded = self
            .transition(id, stage, |stored| stored.fail(stage, message, clock))
            .await;
        if let Err(err) = recorded {
            tracing::error!(error = %err, "failed to record publish run failure");
        }
    }

    async fn push_preview(&self, owner: &UserId, preview: &PreviewTask) {
        deliver(
            "preview_updated",
            self.notifier.preview_updated(owner, preview).await,
        );
    }
}

struct PreparedRun<'a> {
    target: &'a TargetConfig,
    capability: Arc<dyn PlatformCapability>,
    locator: SourceLocator,
    project_path: Utf8PathBuf,
}

fn deliver(event: &'static str, outcome: NotificationResult<()>) {
    if let Err(err) = outcome {
        tracing::warn!(event, error = %err, "notification delivery failed");
    }
}

async fn read_preview_image(project_path: Utf8PathBuf) -> Result<Vec<u8>, PreviewArtifactError> {
    let path = preview_qr_path(&project_path);
    let outcome = tokio::task::spawn_blocking(move || {
        let dir = Dir::open_ambient_dir(&project_path, ambient_authority())?;
        dir.read(PREVIEW_QR_FILE_NAME)
    })
    .await;

    let read = outcome.unwrap_or_else(|join_err| Err(std::io::Error::other(join_err)));
    read.map_err(|err| PreviewArtifactError {
        path,
        source: Arc::new(err),
    })
}
