//! Stage-level errors collected by the orchestrator.

use super::{BuildError, DispatchError, FetchError};
use crate::config::ConfigError;
use crate::release::{
    domain::{ReleaseDomainError, Stage},
    ports::{CapabilityError, TaskStoreError},
};
use camino::Utf8PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// The preview QR image could not be read.
#[derive(Debug, Clone, Error)]
#[error("failed to read preview QR code at {path}: {source}")]
pub struct PreviewArtifactError {
    /// Expected image path.
    pub path: Utf8PathBuf,
    /// Underlying I/O error.
    pub source: Arc<std::io::Error>,
}

/// Any failure that ends a run.
#[derive(Debug, Clone, Error)]
pub enum StageError {
    /// Domain validation or transition failed.
    #[error(transparent)]
    Domain(#[from] ReleaseDomainError),
    /// Run configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The platform type could not be dispatched.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// Source fetching failed or timed out.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// A build step failed.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// The platform upload or preview failed.
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    /// The preview QR image was missing or unreadable.
    #[error(transparent)]
    PreviewArtifact(#[from] PreviewArtifactError),
    /// The task store failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// A [`StageError`] attributed to the stage it ended.
#[derive(Debug, Clone, Error)]
#[error("{stage} stage failed: {error}")]
pub struct StageFailure {
    /// Stage that was running.
    pub stage: Stage,
    /// What went wrong.
    pub error: StageError,
}

/// Attributes errors to a stage.
pub(crate) trait AtStage<T> {
    /// Converts the error into a [`StageFailure`] at `stage`.
    fn at(self, stage: Stage) -> Result<T, StageFailure>;
}

impl<T, E> AtStage<T> for Result<T, E>
where
    E: Into<StageError>,
{
    fn at(self, stage: Stage) -> Result<T, StageFailure> {
        self.map_err(|err| StageFailure {
            stage,
            error: err.into(),
        })
    }
}
