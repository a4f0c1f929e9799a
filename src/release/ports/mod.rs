//! Port contracts for release runs.
//!
//! Ports define infrastructure-agnostic interfaces for the collaborators a
//! run drives: task persistence, push notifications, shell commands, source
//! transfer and the per-platform vendor tooling.

pub mod capability;
pub mod command;
pub mod fetcher;
pub mod notification;
pub mod task_store;

pub use capability::{
    CapabilityError, CapabilityResult, PlatformCapability, PreviewRequest, UploadRequest,
    preview_qr_path,
};
#[cfg(test)]
pub use command::MockCommandRunner;
pub use command::{CommandError, CommandOutput, CommandResult, CommandRunner};
pub use fetcher::{SourceFetchError, SourceFetchResult, SourceFetcher};
pub use notification::{NotificationChannel, NotificationError, NotificationResult};
pub use task_store::{TaskStore, TaskStoreError, TaskStoreResult};
