//! Storage traits for the Taskd storage abstraction layer.
//!
//! This module defines the contracts that all storage backends must
//! implement. Implementations must be thread-safe (`Send + Sync`).

use async_trait::async_trait;
use uuid::Uuid;

use taskd_core::{Task, User};

use crate::error::StorageError;
use crate::types::{NewTask, NewUser, TaskChanges};

/// Persistence contract for the task list.
///
/// A missing task is a domain outcome, not an infrastructure failure:
/// `get` returns `None` and `update`/`delete` return
/// `StorageError::NotFound` so callers can map it to a 404.
///
/// # Example
///
/// ```ignore
/// use taskd_storage::{TaskStorage, StorageError};
/// use taskd_core::Task;
/// use uuid::Uuid;
///
/// async fn fetch(storage: &dyn TaskStorage, id: Uuid) -> Result<Task, StorageError> {
///     storage
///         .get(id)
///         .await?
///         .ok_or_else(|| StorageError::not_found("task", id.to_string()))
/// }
/// ```
#[async_trait]
pub trait TaskStorage: Send + Sync {
    /// Returns all tasks ordered by creation time, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues.
    async fn list(&self) -> Result<Vec<Task>, StorageError>;

    /// Reads a task by ID.
    ///
    /// Returns `None` if the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing tasks.
    async fn get(&self, id: Uuid) -> Result<Option<Task>, StorageError>;

    /// Creates a new task.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidInput` if the description is blank.
    async fn create(&self, draft: NewTask) -> Result<Task, StorageError>;

    /// Applies a partial update to an existing task.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the task does not exist.
    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Task, StorageError>;

    /// Deletes a task by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the task does not exist.
    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;
}

/// Persistence contract for user identities.
///
/// Used only by credential issuance (upsert-on-login) and profile reads.
/// Credential verification never touches storage.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Finds a user by email.
    ///
    /// Returns `None` if no user has that email.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Finds a user by ID.
    ///
    /// Returns `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError>;

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the email is taken.
    async fn create(&self, draft: NewUser) -> Result<User, StorageError>;
}
