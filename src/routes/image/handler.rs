use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::AppError;
use crate::model::Image;
use crate::utils::Claims;

use super::model::RegisterImageRequest;

#[axum::debug_handler]
pub async fn register_image(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RegisterImageRequest>,
) -> Result<(StatusCode, Json<Image>), AppError> {
    let image = Image::register(state.store.as_ref(), req, claims.sub).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

#[axum::debug_handler]
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(image_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    Image::remove(state.store.as_ref(), image_id, claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}
