//! Response caching: two-tier backend plus the cache-aside middleware.

pub mod backend;
pub mod response;

pub use backend::{CacheBackend, CacheStats, CachedEntry};
pub use response::{ResponseCache, cache_response};

/// Scope for the task list route (`GET /tasks`).
pub const TASKS_SCOPE: &str = "tasks";

/// Scope for single task routes (`GET /tasks/{id}`).
pub const TASK_SCOPE: &str = "task";

/// Invalidate every cached task read.
///
/// Called after each successful mutation. Both the list scope and the
/// item scope are cleared; an update to one task also changes what the
/// list returns.
pub async fn invalidate_task_scopes(backend: &CacheBackend) {
    backend.invalidate_scope(TASKS_SCOPE).await;
    backend.invalidate_scope(TASK_SCOPE).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn scope_invalidation_leaves_other_scopes() {
        let backend = CacheBackend::new_local();
        let ttl = Duration::from_secs(60);

        backend.set("tasks:/tasks", b"list".to_vec(), ttl).await;
        backend.set("task:/tasks/1", b"one".to_vec(), ttl).await;
        backend.set("other:/thing", b"keep".to_vec(), ttl).await;

        invalidate_task_scopes(&backend).await;

        assert!(backend.get("tasks:/tasks", ttl).await.is_none());
        assert!(backend.get("task:/tasks/1", ttl).await.is_none());
        assert!(backend.get("other:/thing", ttl).await.is_some());
    }

    #[tokio::test]
    async fn task_scope_prefix_does_not_match_tasks_scope() {
        let backend = CacheBackend::new_local();
        let ttl = Duration::from_secs(60);

        backend.set("tasks:/tasks", b"list".to_vec(), ttl).await;

        // "task" scope uses the "task:" prefix, which must not catch
        // keys in the "tasks" scope.
        backend.invalidate_scope(TASK_SCOPE).await;

        assert!(backend.get("tasks:/tasks", ttl).await.is_some());
    }
}
