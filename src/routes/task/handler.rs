use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::AppError;
use crate::model::Task;
use crate::utils::Claims;

use super::model::{CreateTaskRequest, UpdateTaskRequest};

#[axum::debug_handler]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = Task::list(state.store.as_ref(), event_id, claims.sub).await?;
    Ok(Json(tasks))
}

#[axum::debug_handler]
pub async fn create_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let task = Task::create(state.store.as_ref(), event_id, claims.sub, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[axum::debug_handler]
pub async fn update_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(task_id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let task = Task::update(state.store.as_ref(), task_id, claims.sub, req).await?;
    Ok(Json(task))
}

#[axum::debug_handler]
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(task_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    Task::delete(state.store.as_ref(), task_id, claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}
