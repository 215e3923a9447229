//! The task entity.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A single entry in the task list.
///
/// Listing order is `created_at` descending; the creator reference is
/// nullable because tasks can be created before any user identified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// The task ID.
    pub id: Uuid,
    /// Human-readable description. Never empty.
    pub description: String,
    /// Whether the task has been completed.
    pub completed: bool,
    /// The user who created the task, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// When the task was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the task was last modified.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Task {
    /// Creates a new open task with a generated ID and current timestamps.
    #[must_use]
    pub fn new(description: impl Into<String>, user_id: Option<Uuid>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: crate::generate_id(),
            description: description.into(),
            completed: false,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_starts_open() {
        let task = Task::new("buy milk", None);
        assert!(!task.completed);
        assert_eq!(task.description, "buy milk");
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn task_serializes_timestamps_as_rfc3339() {
        let task = Task::new("write report", None);
        let json = serde_json::to_value(&task).unwrap();
        let created = json["created_at"].as_str().unwrap();
        assert!(created.contains('T'));
        // user_id is omitted when absent
        assert!(json.get("user_id").is_none());
    }
}
