//! Port for transferring a project source tree into a directory.

use super::CommandError;
use crate::release::domain::SourceLocator;
use async_trait::async_trait;
use camino::Utf8Path;
use std::sync::Arc;
use thiserror::Error;

/// Result type for source transfers.
pub type SourceFetchResult<T> = Result<T, SourceFetchError>;

/// Source transfer contract.
///
/// Implementations must stop their work when the returned future is
/// dropped; the deadline in `BoundedFetcher` relies on it.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Transfers the source named by `locator` into `destination`, which
    /// exists and is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SourceFetchError`] when the transfer fails.
    async fn fetch(
        &self,
        locator: &SourceLocator,
        destination: &Utf8Path,
    ) -> SourceFetchResult<()>;
}

/// Errors returned by source fetchers.
#[derive(Debug, Clone, Error)]
pub enum SourceFetchError {
    /// The transfer command failed.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Any other transfer failure.
    #[error("source transfer failed: {0}")]
    Transfer(Arc<dyn std::error::Error + Send + Sync>),
}

impl SourceFetchError {
    /// Wraps a transfer error.
    pub fn transfer(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transfer(Arc::new(err))
    }
}
