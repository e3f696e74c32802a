use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;
use crate::model::Category;
use crate::routes::event::ChangedResponse;
use crate::utils::Claims;

use super::model::{self, SubscriptionStatus};

#[axum::debug_handler]
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(category_id): Path<i64>,
) -> Result<(StatusCode, Json<ChangedResponse>), AppError> {
    let changed = model::subscribe(state.store.as_ref(), claims.sub, category_id).await?;
    Ok((StatusCode::CREATED, Json(ChangedResponse { changed })))
}

#[axum::debug_handler]
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(category_id): Path<i64>,
) -> Result<Json<ChangedResponse>, AppError> {
    let changed = model::unsubscribe(state.store.as_ref(), claims.sub, category_id).await?;
    Ok(Json(ChangedResponse { changed }))
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub category_id: i64,
}

/// 路由上挂着 SUBSCRIPTION 守卫，到这里必然已订阅；
/// 处理器本身仍按查询结果作答
#[axum::debug_handler]
pub async fn check_subscription(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<SubscriptionStatus>, AppError> {
    let status = model::status(state.store.as_ref(), claims.sub, query.category_id).await?;
    Ok(Json(status))
}

#[axum::debug_handler]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = model::subscriptions(state.store.as_ref(), claims.sub).await?;
    Ok(Json(categories))
}
