//! Notification channel that writes run snapshots to the log.

use async_trait::async_trait;

use crate::release::{
    domain::{PlatformType, PreviewTask, Task, UserId},
    ports::{NotificationChannel, NotificationError, NotificationResult},
};

/// Emits every notification as an `info` event with a JSON snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationChannel;

impl TracingNotificationChannel {
    /// Creates a tracing-backed channel.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn snapshot(value: &impl serde::Serialize) -> NotificationResult<String> {
    serde_json::to_string(value).map_err(|err| NotificationError::Encoding(err.to_string()))
}

#[async_trait]
impl NotificationChannel for TracingNotificationChannel {
    async fn task_created(&self, task: &Task) -> NotificationResult<()> {
        tracing::info!(task_id = %task.id(), task = %snapshot(task)?, "task created");
        Ok(())
    }

    async fn task_updated(&self, task: &Task) -> NotificationResult<()> {
        tracing::info!(
            task_id = %task.id(),
            status = %task.status(),
            task = %snapshot(task)?,
            "task updated"
        );
        Ok(())
    }

    async fn run_confirmed(
        &self,
        user_id: &UserId,
        platform_type: &PlatformType,
    ) -> NotificationResult<()> {
        tracing::info!(user_id = %user_id, platform_type = %platform_type, "publish run confirmed");
        Ok(())
    }

    async fn preview_updated(
        &self,
        user_id: &UserId,
        preview: &PreviewTask,
    ) -> NotificationResult<()> {
        tracing::info!(
            user_id = %user_id,
            preview_id = %preview.id(),
            status = %preview.status(),
            journal_len = preview.journal().len(),
            "preview updated"
        );
        Ok(())
    }
}
