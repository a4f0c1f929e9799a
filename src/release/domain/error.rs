//! Error types for release domain validation and parsing.

use super::RunStatus;
use thiserror::Error;

/// Errors returned while constructing or mutating release domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReleaseDomainError {
    /// A required text field is empty after trimming.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A value used as a working-directory segment would escape its parent.
    #[error("{field} '{value}' cannot be used as a path segment")]
    InvalidPathSegment {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: String,
    },

    /// The run already reached a terminal status.
    #[error("run is already {0} and accepts no further stage transitions")]
    AlreadyTerminal(RunStatus),

    /// The journal could not be serialized for persistence.
    #[error("failed to encode stage journal: {0}")]
    JournalEncoding(String),

    /// A persisted status value is unknown.
    #[error(transparent)]
    Status(#[from] ParseRunStatusError),
}

/// Error returned while parsing run statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown run status: {0}")]
pub struct ParseRunStatusError(pub String);

/// A platform type string matched none of the known platform tokens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown mini-program platform: {0}")]
pub struct UnknownPlatform(pub String);

/// A serialized journal could not be parsed.
///
/// Recovered by starting over from an empty journal; never surfaced on a
/// task.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("stage journal is corrupt: {0}")]
pub struct JournalCorrupt(pub String);
