//! Task CRUD endpoints.
//!
//! Reads go through the response cache middleware; every successful
//! mutation invalidates both task cache scopes before responding, so a
//! read issued after a mutation's response never replays a pre-mutation
//! body from this instance.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use taskd_auth::IdentityClaims;
use taskd_core::Task;
use taskd_storage::{NewTask, TaskChanges};

use crate::cache;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    taskd_core::parse_id(raw).map_err(|_| ApiError::validation("invalid task id"))
}

/// `GET /tasks` - all tasks, newest first.
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.tasks.list().await?;
    Ok(Json(tasks))
}

/// `GET /tasks/{id}` - a single task.
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    state
        .tasks
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task {id} not found")))
}

/// `POST /tasks` - create a task owned by the authenticated user.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(claims): Extension<IdentityClaims>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    if req.description.trim().is_empty() {
        return Err(ApiError::validation("description must not be empty"));
    }

    let task = state
        .tasks
        .create(NewTask::new(req.description, Some(claims.sub)))
        .await?;

    cache::invalidate_task_scopes(&state.cache).await;
    tracing::info!(task_id = %task.id, "task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /tasks/{id}` - partial update of description and/or completion.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;

    let changes = TaskChanges {
        description: req.description,
        completed: req.completed,
    };
    if changes.is_empty() {
        return Err(ApiError::validation("no fields to update"));
    }

    let task = state.tasks.update(id, changes).await?;

    cache::invalidate_task_scopes(&state.cache).await;
    tracing::info!(task_id = %task.id, "task updated");

    Ok(Json(task))
}

/// `DELETE /tasks/{id}` - remove a task.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;

    state.tasks.delete(id).await?;

    cache::invalidate_task_scopes(&state.cache).await;
    tracing::info!(task_id = %id, "task deleted");

    Ok(StatusCode::NO_CONTENT)
}
