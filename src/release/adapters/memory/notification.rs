//! Notification channel that records every pushed snapshot.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use crate::release::{
    domain::{PlatformType, PreviewTask, Task, UserId},
    ports::{NotificationChannel, NotificationError, NotificationResult},
};

/// One message pushed through a [`RecordingNotificationChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A publish task was created.
    TaskCreated(Task),
    /// A publish task changed.
    TaskUpdated(Task),
    /// A publish run was confirmed to its owner.
    RunConfirmed {
        /// Owner of the run.
        user_id: UserId,
        /// Published mini-program type.
        platform_type: PlatformType,
    },
    /// A preview run changed.
    PreviewUpdated {
        /// Owner of the run.
        user_id: UserId,
        /// Snapshot pushed.
        preview: PreviewTask,
    },
}

/// Thread-safe channel keeping every notification in delivery order.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationChannel {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotificationChannel {
    /// Creates an empty recording channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all notifications in delivery order.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the task snapshots pushed by `task_updated`.
    #[must_use]
    pub fn task_updates(&self) -> Vec<Task> {
        self.notifications()
            .into_iter()
            .filter_map(|notification| match notification {
                Notification::TaskUpdated(task) => Some(task),
                _ => None,
            })
            .collect()
    }

    /// Returns the preview snapshots pushed by `preview_updated`.
    #[must_use]
    pub fn preview_updates(&self) -> Vec<PreviewTask> {
        self.notifications()
            .into_iter()
            .filter_map(|notification| match notification {
                Notification::PreviewUpdated { preview, .. } => Some(preview),
                _ => None,
            })
            .collect()
    }

    /// Returns how many run confirmations were sent.
    #[must_use]
    pub fn confirmation_count(&self) -> usize {
        self.notifications()
            .iter()
            .filter(|notification| matches!(notification, Notification::RunConfirmed { .. }))
            .count()
    }

    fn record(&self, notification: Notification) -> NotificationResult<()> {
        self.sent
            .lock()
            .map_err(|err| NotificationError::transport(std::io::Error::other(err.to_string())))?
            .push(notification);
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for RecordingNotificationChannel {
    async fn task_created(&self, task: &Task) -> NotificationResult<()> {
        self.record(Notification::TaskCreated(task.clone()))
    }

    async fn task_updated(&self, task: &Task) -> NotificationResult<()> {
        self.record(Notification::TaskUpdated(task.clone()))
    }

    async fn run_confirmed(
        &self,
        user_id: &UserId,
        platform_type: &PlatformType,
    ) -> NotificationResult<()> {
        self.record(Notification::RunConfirmed {
            user_id: user_id.clone(),
            platform_type: platform_type.clone(),
        })
    }

    async fn preview_updated(
        &self,
        user_id: &UserId,
        preview: &PreviewTask,
    ) -> NotificationResult<()> {
        self.record(Notification::PreviewUpdated {
            user_id: user_id.clone(),
            preview: preview.clone(),
        })
    }
}
