//! Application services that drive release runs.

mod build;
mod dispatch;
mod error;
mod fetch;
mod orchestrator;

pub use build::{BuildError, BuildResult, BuildRunner, BuildStep};
pub use dispatch::{DispatchError, PlatformDispatcher};
pub(crate) use error::AtStage;
pub use error::{PreviewArtifactError, StageError, StageFailure};
pub use fetch::{BoundedFetcher, FetchError, FetchResult};
pub use orchestrator::{OrchestratorPorts, PreviewRunRequest, PublishRequest, TaskOrchestrator};
