//! In-memory task store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::release::{
    domain::{PersistedTask, TaskId},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store keeping the persisted record form.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<Records>>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the serialized journal of a stored task verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    pub fn overwrite_journal(&self, id: TaskId, raw: impl Into<String>) -> TaskStoreResult<()> {
        let mut state = self.write_state()?;
        let record = state.get_mut(&id).ok_or(TaskStoreError::NotFound(id))?;
        record.journal = raw.into();
        Ok(())
    }

    /// Returns the number of stored tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lock is poisoned.
    pub fn task_count(&self) -> TaskStoreResult<usize> {
        Ok(self.read_state()?.len())
    }
}

type Records = HashMap<TaskId, PersistedTask>;

impl InMemoryTaskStore {
    fn read_state(&self) -> TaskStoreResult<RwLockReadGuard<'_, Records>> {
        self.state.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(&self) -> TaskStoreResult<RwLockWriteGuard<'_, Records>> {
        self.state.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, task: &PersistedTask) -> TaskStoreResult<TaskId> {
        let mut state = self.write_state()?;
        if state.contains_key(&task.id) {
            return Err(TaskStoreError::DuplicateTask(task.id));
        }
        state.insert(task.id, task.clone());
        Ok(task.id)
    }

    async fn get(&self, id: TaskId) -> TaskStoreResult<PersistedTask> {
        let state = self.read_state()?;
        state.get(&id).cloned().ok_or(TaskStoreError::NotFound(id))
    }

    async fn update(&self, task: &PersistedTask) -> TaskStoreResult<()> {
        let mut state = self.write_state()?;
        let record = state
            .get_mut(&task.id)
            .ok_or(TaskStoreError::NotFound(task.id))?;
        *record = task.clone();
        Ok(())
    }
}
