use axum::extract::{Json, Path, State};

use crate::AppState;
use crate::error::AppError;
use crate::model::{Statistics, User};
use crate::store::StatsStore;

use super::model::{self, SetRolesRequest};

#[axum::debug_handler]
pub async fn statistics(
    State(state): State<AppState>,
) -> Result<Json<Statistics>, AppError> {
    let stats = state.store.statistics().await?;
    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn set_user_roles(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<SetRolesRequest>,
) -> Result<Json<User>, AppError> {
    let user = model::set_user_roles(state.store.as_ref(), user_id, req.roles).await?;
    tracing::info!("roles of user {} changed to {:?}", user.id, user.roles);
    Ok(Json(user))
}
