//! Push-notification port for live run status.

use crate::release::domain::{PlatformType, PreviewTask, Task, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Channel that pushes run snapshots to subscribers.
///
/// Delivery is best effort: the orchestrator logs failures and carries on.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Announces a newly created publish task.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when the snapshot cannot be delivered.
    async fn task_created(&self, task: &Task) -> NotificationResult<()>;

    /// Pushes the latest snapshot of a publish task.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when the snapshot cannot be delivered.
    async fn task_updated(&self, task: &Task) -> NotificationResult<()>;

    /// Confirms to the owner that a publish run uploaded successfully.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when the snapshot cannot be delivered.
    async fn run_confirmed(
        &self,
        user_id: &UserId,
        platform_type: &PlatformType,
    ) -> NotificationResult<()>;

    /// Pushes the latest snapshot of a preview run to its owner.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when the snapshot cannot be delivered.
    async fn preview_updated(
        &self,
        user_id: &UserId,
        preview: &PreviewTask,
    ) -> NotificationResult<()>;
}

/// Errors returned by notification transports.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// The snapshot could not be encoded for the transport.
    #[error("failed to encode notification: {0}")]
    Encoding(String),

    /// The transport rejected or dropped the message.
    #[error("notification transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
