//! Ephemeral preview run state pushed to subscribers.

use super::{Journal, PreviewId, ReleaseDomainError, RunStatus, Stage};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// File name the platform tooling writes the preview QR code to.
pub const PREVIEW_QR_FILE_NAME: &str = "previewQr.jpg";

/// In-memory state of a preview run.
///
/// Never persisted; subscribers see it through the notification channel
/// after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewTask {
    id: PreviewId,
    status: RunStatus,
    journal: Journal,
    error_message: Option<String>,
    qr_code: Option<String>,
}

impl PreviewTask {
    /// Starts a preview run whose journal holds the init event.
    #[must_use]
    pub fn start(id: PreviewId, clock: &impl Clock) -> Self {
        Self {
            id,
            status: RunStatus::Publishing,
            journal: Journal::starting_with(Stage::Init.completion_message(), clock.utc()),
            error_message: None,
            qr_code: None,
        }
    }

    /// Returns the preview identifier.
    #[must_use]
    pub const fn id(&self) -> &PreviewId {
        &self.id
    }

    /// Returns the run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Returns the stage journal.
    #[must_use]
    pub const fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Returns the failure message, if the run failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the embedded QR image as a `data:` URI, if generated.
    #[must_use]
    pub fn qr_code(&self) -> Option<&str> {
        self.qr_code.as_deref()
    }

    /// Records a completed intermediate stage.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError::AlreadyTerminal`] once the run
    /// succeeded or failed.
    pub fn record_stage(
        &mut self,
        stage: Stage,
        clock: &impl Clock,
    ) -> Result<(), ReleaseDomainError> {
        self.ensure_active()?;
        self.journal.push(stage.completion_message(), clock.utc());
        Ok(())
    }

    /// Embeds the QR image and marks the run successful.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError::AlreadyTerminal`] once the run
    /// succeeded or failed.
    pub fn succeed(
        &mut self,
        stage: Stage,
        qr_image: &[u8],
        clock: &impl Clock,
    ) -> Result<(), ReleaseDomainError> {
        self.ensure_active()?;
        self.journal.push(stage.completion_message(), clock.utc());
        self.qr_code = Some(jpeg_data_uri(qr_image));
        self.status = RunStatus::Success;
        Ok(())
    }

    /// Records the failed stage and marks the run failed.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError::AlreadyTerminal`] once the run
    /// succeeded or failed.
    pub fn fail(
        &mut self,
        stage: Stage,
        error_message: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), ReleaseDomainError> {
        self.ensure_active()?;
        self.journal.push(stage.failure_message(), clock.utc());
        self.error_message = Some(error_message.into());
        self.status = RunStatus::Failed;
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), ReleaseDomainError> {
        if self.status.is_terminal() {
            return Err(ReleaseDomainError::AlreadyTerminal(self.status));
        }
        Ok(())
    }
}

fn jpeg_data_uri(image: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(image))
}
