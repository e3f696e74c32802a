use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::AppError;
use crate::model::ChecklistTemplate;

use super::model::{CreateTemplateRequest, TemplateDetail, UpdateTemplateRequest};

#[axum::debug_handler]
pub async fn create_template(
    State(state): State<AppState>,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateDetail>), AppError> {
    let detail = ChecklistTemplate::create(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[axum::debug_handler]
pub async fn update_template(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
    Json(req): Json<UpdateTemplateRequest>,
) -> Result<Json<TemplateDetail>, AppError> {
    let detail = ChecklistTemplate::update(state.store.as_ref(), template_id, req).await?;
    Ok(Json(detail))
}

#[axum::debug_handler]
pub async fn delete_template(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    ChecklistTemplate::remove(state.store.as_ref(), template_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
