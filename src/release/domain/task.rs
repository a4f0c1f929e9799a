//! Persisted publish task aggregate.

use super::{
    BranchName, Journal, PlatformType, ReleaseDomainError, RunStatus, Stage, TaskId, UserId,
    VersionLabel,
};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Caller-supplied fields of a new publish task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Mini-program type being published.
    pub platform_type: PlatformType,
    /// Version label for the upload.
    pub version: VersionLabel,
    /// Source branch to fetch.
    pub branch: BranchName,
    /// Free-text release description.
    pub description: String,
    /// User who started the run.
    pub owner: UserId,
}

/// Publish task aggregate root.
///
/// The status only moves forward: `Publishing` to either `Success` or
/// `Failed`, after which every mutation is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    platform_type: PlatformType,
    version: VersionLabel,
    branch: BranchName,
    description: String,
    owner: UserId,
    status: RunStatus,
    error_message: Option<String>,
    journal: Journal,
    qr_code_url: Option<String>,
}

/// Store-boundary form of a task, with the journal serialized as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTask {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted mini-program type.
    pub platform_type: String,
    /// Persisted version label.
    pub version: String,
    /// Persisted branch.
    pub branch: String,
    /// Persisted description.
    pub description: String,
    /// Persisted owner.
    pub owner: String,
    /// Persisted status (`publishing`, `success` or `failed`).
    pub status: String,
    /// Persisted failure message.
    pub error_message: Option<String>,
    /// Serialized journal text.
    pub journal: String,
    /// Persisted QR code URL.
    pub qr_code_url: Option<String>,
}

impl Task {
    /// Creates a new publishing task whose journal holds the init event.
    #[must_use]
    pub fn new(fields: NewTask, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            platform_type: fields.platform_type,
            version: fields.version,
            branch: fields.branch,
            description: fields.description,
            owner: fields.owner,
            status: RunStatus::Publishing,
            error_message: None,
            journal: Journal::starting_with(Stage::Init.completion_message(), clock.utc()),
            qr_code_url: None,
        }
    }

    /// Reconstructs a task from its persisted form.
    ///
    /// A corrupt journal is replaced by an empty one instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError`] when a scalar field fails validation
    /// or the status is unknown.
    pub fn from_persisted(data: PersistedTask) -> Result<Self, ReleaseDomainError> {
        Ok(Self {
            id: data.id,
            platform_type: PlatformType::new(data.platform_type)?,
            version: VersionLabel::new(data.version)?,
            branch: BranchName::new(data.branch)?,
            description: data.description,
            owner: UserId::new(data.owner)?,
            status: RunStatus::try_from(data.status.as_str())?,
            error_message: data.error_message,
            journal: Journal::decode_or_empty(&data.journal),
            qr_code_url: data.qr_code_url,
        })
    }

    /// Converts the task into its persisted form.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError::JournalEncoding`] when the journal
    /// cannot be serialized.
    pub fn to_persisted(&self) -> Result<PersistedTask, ReleaseDomainError> {
        let journal = self
            .journal
            .encode()
            .map_err(|err| ReleaseDomainError::JournalEncoding(err.to_string()))?;
        Ok(PersistedTask {
            id: self.id,
            platform_type: self.platform_type.as_str().to_owned(),
            version: self.version.as_str().to_owned(),
            branch: self.branch.as_str().to_owned(),
            description: self.description.clone(),
            owner: self.owner.as_str().to_owned(),
            status: self.status.as_str().to_owned(),
            error_message: self.error_message.clone(),
            journal,
            qr_code_url: self.qr_code_url.clone(),
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the mini-program type.
    #[must_use]
    pub const fn platform_type(&self) -> &PlatformType {
        &self.platform_type
    }

    /// Returns the version label.
    #[must_use]
    pub const fn version(&self) -> &VersionLabel {
        &self.version
    }

    /// Returns the source branch.
    #[must_use]
    pub const fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Returns the release description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Returns the run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Returns the failure message; present only when the task failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the stage journal.
    #[must_use]
    pub const fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Returns the uploaded build's QR code URL, if any.
    #[must_use]
    pub fn qr_code_url(&self) -> Option<&str> {
        self.qr_code_url.as_deref()
    }

    /// Records a completed intermediate stage.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError::AlreadyTerminal`] once the task
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

    /// Records the final stage and marks the task successful.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError::AlreadyTerminal`] once the task
    /// succeeded or failed.
    pub fn succeed(
        &mut self,
        stage: Stage,
        qr_code_url: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), ReleaseDomainError> {
        self.ensure_active()?;
        self.journal.push(stage.completion_message(), clock.utc());
        self.status = RunStatus::Success;
        if qr_code_url.is_some() {
            self.qr_code_url = qr_code_url;
        }
        Ok(())
    }

    /// Records the failed stage and marks the task failed.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError::AlreadyTerminal`] once the task
    /// succeeded or failed.
    pub fn fail(
        &mut self,
        stage: Stage,
        error_message: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), ReleaseDomainError> {
        self.ensure_active()?;
        self.journal.push(stage.failure_message(), clock.utc());
        self.status = RunStatus::Failed;
        self.error_message = Some(error_message.into());
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), ReleaseDomainError> {
        if self.status.is_terminal() {
            return Err(ReleaseDomainError::AlreadyTerminal(self.status));
        }
        Ok(())
    }
}
