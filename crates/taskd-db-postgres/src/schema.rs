//! Schema bootstrap for the PostgreSQL storage backend.
//!
//! Creates the `users` and `tasks` tables if they do not exist. Statements
//! are idempotent so startup is safe against concurrent instances.

use sqlx_core::query::query;
use sqlx_postgres::PgPool;
use tracing::{debug, instrument};

use crate::error::Result;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          UUID PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_TASKS: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id          UUID PRIMARY KEY,
    description TEXT NOT NULL,
    completed   BOOLEAN NOT NULL DEFAULT FALSE,
    user_id     UUID REFERENCES users (id) ON DELETE SET NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_TASKS_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS tasks_created_at_idx ON tasks (created_at DESC)";

/// Ensures all tables and indexes exist.
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    query(CREATE_USERS).execute(pool).await?;
    query(CREATE_TASKS).execute(pool).await?;
    query(CREATE_TASKS_CREATED_AT_INDEX).execute(pool).await?;

    debug!("Database schema is up to date");

    Ok(())
}
