//! `TaskStorage` and `UserStorage` implementations backed by PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use taskd_core::{Task, User};
use taskd_storage::{NewTask, NewUser, StorageError, TaskChanges, TaskStorage, UserStorage};

use crate::config::PostgresConfig;
use crate::error::is_unique_violation;
use crate::pool::{create_pool, test_connection};
use crate::schema::ensure_schema;

/// Converts chrono DateTime (what sqlx rows yield) to time OffsetDateTime.
fn chrono_to_time(dt: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(dt.timestamp()).unwrap_or(OffsetDateTime::UNIX_EPOCH)
        + time::Duration::nanoseconds(i64::from(dt.timestamp_subsec_nanos()))
}

/// Converts time OffsetDateTime to chrono for binding.
fn time_to_chrono(ts: OffsetDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.unix_timestamp(), ts.nanosecond()).unwrap_or_default()
}

type TaskRow = (
    Uuid,
    String,
    bool,
    Option<Uuid>,
    DateTime<Utc>,
    DateTime<Utc>,
);

type UserRow = (Uuid, String, String, DateTime<Utc>, DateTime<Utc>);

fn task_from_row(row: TaskRow) -> Task {
    Task {
        id: row.0,
        description: row.1,
        completed: row.2,
        user_id: row.3,
        created_at: chrono_to_time(row.4),
        updated_at: chrono_to_time(row.5),
    }
}

fn user_from_row(row: UserRow) -> User {
    User {
        id: row.0,
        name: row.1,
        email: row.2,
        created_at: chrono_to_time(row.3),
        updated_at: chrono_to_time(row.4),
    }
}

/// PostgreSQL-backed storage for tasks and users.
#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Creates a storage instance over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database and optionally bootstraps the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created, the server does
    /// not answer a probe query, or the schema statements fail.
    pub async fn connect(config: &PostgresConfig) -> crate::error::Result<Self> {
        let pool = create_pool(config).await?;
        test_connection(&pool).await?;
        if config.bootstrap_schema {
            ensure_schema(&pool).await?;
        }
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl TaskStorage for PostgresStorage {
    async fn list(&self) -> Result<Vec<Task>, StorageError> {
        let rows: Vec<TaskRow> = query_as(
            "SELECT id, description, completed, user_id, created_at, updated_at \
             FROM tasks ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("Failed to list tasks: {e}")))?;

        Ok(rows.into_iter().map(task_from_row).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>, StorageError> {
        let row: Option<TaskRow> = query_as(
            "SELECT id, description, completed, user_id, created_at, updated_at \
             FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("Failed to read task: {e}")))?;

        Ok(row.map(task_from_row))
    }

    async fn create(&self, draft: NewTask) -> Result<Task, StorageError> {
        if draft.description.trim().is_empty() {
            return Err(StorageError::invalid_input("description must not be empty"));
        }

        let task = Task::new(draft.description, draft.user_id);
        let row: TaskRow = query_as(
            "INSERT INTO tasks (id, description, completed, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             RETURNING id, description, completed, user_id, created_at, updated_at",
        )
        .bind(task.id)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.user_id)
        .bind(time_to_chrono(task.created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("Failed to create task: {e}")))?;

        Ok(task_from_row(row))
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Task, StorageError> {
        if let Some(ref description) = changes.description
            && description.trim().is_empty()
        {
            return Err(StorageError::invalid_input("description must not be empty"));
        }

        let row: Option<TaskRow> = query_as(
            "UPDATE tasks SET \
                 description = COALESCE($2, description), \
                 completed = COALESCE($3, completed), \
                 updated_at = $4 \
             WHERE id = $1 \
             RETURNING id, description, completed, user_id, created_at, updated_at",
        )
        .bind(id)
        .bind(changes.description)
        .bind(changes.completed)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("Failed to update task: {e}")))?;

        row.map(task_from_row)
            .ok_or_else(|| StorageError::not_found("task", id.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        let result = query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::internal(format!("Failed to delete task: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("task", id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStorage for PostgresStorage {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let row: Option<UserRow> = query_as(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("Failed to find user: {e}")))?;

        Ok(row.map(user_from_row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        let row: Option<UserRow> =
            query_as("SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StorageError::internal(format!("Failed to find user: {e}")))?;

        Ok(row.map(user_from_row))
    }

    async fn create(&self, draft: NewUser) -> Result<User, StorageError> {
        let user = User::new(draft.name, draft.email);
        let row: UserRow = query_as(
            "INSERT INTO users (id, name, email, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING id, name, email, created_at, updated_at",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(time_to_chrono(user.created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::already_exists("user", &user.email)
            } else {
                StorageError::internal(format!("Failed to create user: {e}"))
            }
        })?;

        Ok(user_from_row(row))
    }
}
