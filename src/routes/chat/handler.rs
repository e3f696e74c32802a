use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;
use crate::model::{ChatMessage, ChatMessageInfo};
use crate::utils::Claims;

use super::model::{CreateMessageRequest, UpdateMessageRequest};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[axum::debug_handler]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ChatMessageInfo>>, AppError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let messages = ChatMessage::list(state.store.as_ref(), event_id, claims.sub, limit).await?;
    Ok(Json(messages))
}

#[axum::debug_handler]
pub async fn create_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let message = ChatMessage::create(state.store.as_ref(), event_id, claims.sub, req).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[axum::debug_handler]
pub async fn update_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(message_id): Path<i64>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    let message = ChatMessage::update(state.store.as_ref(), message_id, claims.sub, req).await?;
    Ok(Json(message))
}

#[axum::debug_handler]
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(message_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    ChatMessage::delete(state.store.as_ref(), message_id, claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}
