use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;
use crate::model::Comment;
use crate::utils::Claims;

use super::model::CreateCommentRequest;

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub event_id: i64,
}

#[axum::debug_handler]
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = Comment::create(state.store.as_ref(), claims.sub, req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[axum::debug_handler]
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<i64>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, AppError> {
    Comment::delete(state.store.as_ref(), comment_id, query.event_id, claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}
