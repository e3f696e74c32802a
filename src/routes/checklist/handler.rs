use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::AppError;
use crate::model::ChecklistItem;
use crate::utils::Claims;

use super::model::{CreateItemRequest, UpdateItemRequest};

#[axum::debug_handler]
pub async fn list_items(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<ChecklistItem>>, AppError> {
    let items = ChecklistItem::list(state.store.as_ref(), event_id, claims.sub).await?;
    Ok(Json(items))
}

#[axum::debug_handler]
pub async fn create_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ChecklistItem>), AppError> {
    let item = ChecklistItem::create(state.store.as_ref(), event_id, claims.sub, req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[axum::debug_handler]
pub async fn apply_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((event_id, template_id)): Path<(i64, i64)>,
) -> Result<(StatusCode, Json<Vec<ChecklistItem>>), AppError> {
    let items =
        ChecklistItem::apply_template(state.store.as_ref(), event_id, template_id, claims.sub)
            .await?;
    Ok((StatusCode::CREATED, Json(items)))
}

#[axum::debug_handler]
pub async fn update_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(item_id): Path<i64>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<ChecklistItem>, AppError> {
    let item = ChecklistItem::update(state.store.as_ref(), item_id, claims.sub, req).await?;
    Ok(Json(item))
}

#[axum::debug_handler]
pub async fn toggle_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(item_id): Path<i64>,
) -> Result<Json<ChecklistItem>, AppError> {
    let item = ChecklistItem::toggle(state.store.as_ref(), item_id, claims.sub).await?;
    Ok(Json(item))
}

#[axum::debug_handler]
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(item_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    ChecklistItem::delete(state.store.as_ref(), item_id, claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}
