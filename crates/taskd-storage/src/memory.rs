//! In-memory storage backend.
//!
//! Backs tests and single-process development setups. Uses `DashMap` for
//! concurrent access; ordering is applied at read time since the map is
//! unordered.

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use uuid::Uuid;

use taskd_core::{Task, User};

use crate::error::StorageError;
use crate::traits::{TaskStorage, UserStorage};
use crate::types::{NewTask, NewUser, TaskChanges};

/// In-memory implementation of [`TaskStorage`] and [`UserStorage`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tasks: DashMap<Uuid, Task>,
    users: DashMap<Uuid, User>,
}

impl MemoryStorage {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks. For tests.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

#[async_trait]
impl TaskStorage for MemoryStorage {
    async fn list(&self) -> Result<Vec<Task>, StorageError> {
        let mut tasks: Vec<Task> = self.tasks.iter().map(|e| e.value().clone()).collect();
        // Newest first; fall back to id ordering so equal timestamps stay stable.
        tasks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(tasks)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>, StorageError> {
        Ok(self.tasks.get(&id).map(|e| e.value().clone()))
    }

    async fn create(&self, draft: NewTask) -> Result<Task, StorageError> {
        if draft.description.trim().is_empty() {
            return Err(StorageError::invalid_input("description must not be empty"));
        }
        let task = Task::new(draft.description, draft.user_id);
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Task, StorageError> {
        let mut entry = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("task", id.to_string()))?;

        if let Some(description) = changes.description {
            if description.trim().is_empty() {
                return Err(StorageError::invalid_input("description must not be empty"));
            }
            entry.description = description;
        }
        if let Some(completed) = changes.completed {
            entry.completed = completed;
        }
        entry.updated_at = OffsetDateTime::now_utc();
        Ok(entry.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        self.tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found("task", id.to_string()))
    }
}

#[async_trait]
impl UserStorage for MemoryStorage {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        Ok(self
            .users
            .iter()
            .find(|e| e.value().email == email)
            .map(|e| e.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        Ok(self.users.get(&id).map(|e| e.value().clone()))
    }

    async fn create(&self, draft: NewUser) -> Result<User, StorageError> {
        if self.find_by_email(&draft.email).await?.is_some() {
            return Err(StorageError::already_exists("user", draft.email));
        }
        let user = User::new(draft.name, draft.email);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}
