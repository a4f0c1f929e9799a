//! Source fetching bounded by a wall-clock budget.

use crate::release::{
    domain::SourceLocator,
    ports::{SourceFetchError, SourceFetcher},
};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`BoundedFetcher::fetch`].
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The transfer did not finish within its budget and was cancelled.
    #[error(
        "fetching project source timed out after {} seconds; check the server network",
        .budget.as_secs()
    )]
    Timeout {
        /// Budget that was exceeded.
        budget: Duration,
    },

    /// The transfer itself failed.
    #[error(transparent)]
    Failure(#[from] SourceFetchError),

    /// The destination directory could not be prepared.
    #[error("failed to prepare working directory {path}: {source}")]
    Workspace {
        /// Destination directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: Arc<std::io::Error>,
    },
}

/// Result type for bounded fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Runs a [`SourceFetcher`] against a deadline.
///
/// The losing transfer is cancelled by dropping its future, so fetchers
/// backed by child processes must kill them on drop.
#[derive(Clone)]
pub struct BoundedFetcher<F>
where
    F: SourceFetcher,
{
    fetcher: Arc<F>,
}

impl<F> BoundedFetcher<F>
where
    F: SourceFetcher,
{
    /// Creates a bounded fetcher around `fetcher`.
    #[must_use]
    pub const fn new(fetcher: Arc<F>) -> Self {
        Self { fetcher }
    }

    /// Clears `destination` and fetches `locator` into it within `budget`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Workspace`] when the directory cannot be
    /// reset, [`FetchError::Failure`] when the transfer fails and
    /// [`FetchError::Timeout`] when the budget elapses first.
    pub async fn fetch(
        &self,
        locator: &SourceLocator,
        destination: &Utf8Path,
        budget: Duration,
    ) -> FetchResult<()> {
        prepare_destination(destination).await?;

        match tokio::time::timeout(budget, self.fetcher.fetch(locator, destination)).await {
            Ok(outcome) => outcome.map_err(FetchError::from),
            Err(_) => Err(FetchError::Timeout { budget }),
        }
    }
}

async fn prepare_destination(destination: &Utf8Path) -> FetchResult<()> {
    let workspace_error = |err: std::io::Error| FetchError::Workspace {
        path: destination.to_owned(),
        source: Arc::new(err),
    };

    if tokio::fs::try_exists(destination)
        .await
        .map_err(workspace_error)?
    {
        tokio::fs::remove_dir_all(destination)
            .await
            .map_err(workspace_error)?;
    }
    tokio::fs::create_dir_all(destination)
        .await
        .map_err(workspace_error)
}
