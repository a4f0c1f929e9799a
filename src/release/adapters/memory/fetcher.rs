//! Scripted source fetcher.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::release::{
    domain::SourceLocator,
    ports::{SourceFetchError, SourceFetchResult, SourceFetcher},
};

/// Fetcher that optionally sleeps, then succeeds or fails as scripted.
///
/// A successful fetch writes a `package.json` marker into the destination.
#[derive(Debug, Clone, Default)]
pub struct StaticSourceFetcher {
    delay: Option<Duration>,
    failure: Option<String>,
    fetched: Arc<Mutex<Vec<(SourceLocator, Utf8PathBuf)>>>,
}

impl StaticSourceFetcher {
    /// Creates a fetcher that succeeds immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` before finishing.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails every transfer with `message`.
    #[must_use]
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Returns the locators and destinations fetched so far.
    #[must_use]
    pub fn fetched(&self) -> Vec<(SourceLocator, Utf8PathBuf)> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SourceFetcher for StaticSourceFetcher {
    async fn fetch(
        &self,
        locator: &SourceLocator,
        destination: &Utf8Path,
    ) -> SourceFetchResult<()> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((locator.clone(), destination.to_owned()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(SourceFetchError::transfer(std::io::Error::other(
                message.clone(),
            )));
        }
        tokio::fs::write(destination.join("package.json"), "{}")
            .await
            .map_err(SourceFetchError::transfer)
    }
}
