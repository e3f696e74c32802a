use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::AppError;
use crate::model::User;
use crate::store::UserStore;
use crate::utils::{Claims, generate_token};

use super::model::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let user = User::register(state.store.as_ref(), req).await?;

    let token = generate_token(user.id, &user.roles, &state.config)
        .map_err(|e| AppError::Internal(format!("failed to issue token: {}", e)))?;

    tracing::info!("registered user {} ({})", user.username, user.id);
    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = User::login(state.store.as_ref(), req).await?;

    let token = generate_token(user.id, &user.roles, &state.config)
        .map_err(|e| AppError::Internal(format!("failed to issue token: {}", e)))?;

    Ok(Json(AuthResponse { user, token }))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<User>, AppError> {
    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    Ok(Json(user))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    let user = User::update_profile(state.store.as_ref(), claims.sub, req).await?;
    Ok(Json(user))
}
