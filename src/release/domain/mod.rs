//! Domain model for mini-program publish and preview runs.
//!
//! Runs are modelled as aggregates ([`Task`] for persisted publish runs,
//! [`PreviewTask`] for ephemeral preview runs) that move through a fixed
//! sequence of [`Stage`]s, each recorded in an append-only [`Journal`].

mod error;
mod ids;
mod journal;
mod platform;
mod preview;
mod source;
mod stage;
mod status;
mod task;

pub use error::{JournalCorrupt, ParseRunStatusError, ReleaseDomainError, UnknownPlatform};
pub use ids::{BranchName, PlatformType, PreviewId, TaskId, UserId, VersionLabel};
pub use journal::{Journal, StageEvent};
pub use platform::Platform;
pub use preview::{PREVIEW_QR_FILE_NAME, PreviewTask};
pub use source::{SourceLocator, project_path};
pub use stage::Stage;
pub use status::RunStatus;
pub use task::{NewTask, PersistedTask, Task};
