//! Identifier and validated scalar types for the release domain.

use super::{Platform, ReleaseDomainError, UnknownPlatform};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a persisted publish task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied identifier of an ephemeral preview run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewId(String);

impl PreviewId {
    /// Creates a validated preview identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError::EmptyField`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ReleaseDomainError> {
        required("preview id", value.into()).map(Self)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the user who owns a run and receives its notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError::EmptyField`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ReleaseDomainError> {
        required("user id", value.into()).map(Self)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form mini-program type such as `wechat-mini`.
///
/// The value keys per-target configuration and names a directory under the
/// workspace root, so it must be a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformType(String);

impl PlatformType {
    /// Creates a validated platform type.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError`] when the value is blank or is not a
    /// single path segment.
    pub fn new(value: impl Into<String>) -> Result<Self, ReleaseDomainError> {
        path_segment("platform type", value.into()).map(Self)
    }

    /// Resolves the platform family this type belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownPlatform`] when no known platform token matches.
    pub fn platform(&self) -> Result<Platform, UnknownPlatform> {
        Platform::resolve(&self.0)
    }

    /// Returns the platform type as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PlatformType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Version label attached to an uploaded build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionLabel(String);

impl VersionLabel {
    /// Creates a validated version label.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError`] when the value is blank or is not a
    /// single path segment.
    pub fn new(value: impl Into<String>) -> Result<Self, ReleaseDomainError> {
        path_segment("version", value.into()).map(Self)
    }

    /// Derives a preview version label (`MM.DD.HH.mm.ss`) from local time.
    #[must_use]
    pub fn from_local_time(now: DateTime<Local>) -> Self {
        Self(now.format("%m.%d.%H.%M.%S").to_string())
    }

    /// Returns the label as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source branch (or commit-ish) a run fetches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Creates a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseDomainError::EmptyField`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ReleaseDomainError> {
        required("branch", value.into()).map(Self)
    }

    /// Returns the branch name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn required(field: &'static str, value: String) -> Result<String, ReleaseDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReleaseDomainError::EmptyField(field));
    }
    Ok(trimmed.to_owned())
}

fn path_segment(field: &'static str, value: String) -> Result<String, ReleaseDomainError> {
    let normalized = required(field, value)?;
    let escapes = normalized == "." || normalized == "..";
    if escapes || normalized.contains(['/', '\\']) {
        return Err(ReleaseDomainError::InvalidPathSegment {
            field,
            value: normalized,
        });
    }
    Ok(normalized)
}
