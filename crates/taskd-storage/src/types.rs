//! Input types used by the storage traits.

use uuid::Uuid;

/// Fields for creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Task description. Must be non-empty; backends reject blank input.
    pub description: String,
    /// The creating user, if the request was authenticated.
    pub user_id: Option<Uuid>,
}

impl NewTask {
    /// Creates a new task draft.
    #[must_use]
    pub fn new(description: impl Into<String>, user_id: Option<Uuid>) -> Self {
        Self {
            description: description.into(),
            user_id,
        }
    }
}

/// Partial update to an existing task.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    /// New description, if changing.
    pub description: Option<String>,
    /// New completion state, if changing.
    pub completed: Option<bool>,
}

impl TaskChanges {
    /// Returns `true` if no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.completed.is_none()
    }
}

/// Fields for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address, unique across users.
    pub email: String,
}

impl NewUser {
    /// Creates a new user draft.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}
