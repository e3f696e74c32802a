use axum::extract::{Json, Path, Query, State};

use crate::AppState;
use crate::error::AppError;
use crate::model::{
    Category, ChecklistTemplate, CommentInfo, EventDetail, EventFilter, EventInfo, Organization,
};
use crate::routes::template::TemplateDetail;
use crate::store::{CommentStore, EventStore, OrganizationStore, TemplateStore, UserStore};

use super::model::{PublicUserInfo, cached_event_detail, store_event_detail};

/// 过滤条件全部走查询串，缺省字段不参与过滤
#[axum::debug_handler]
pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Result<Json<Vec<EventInfo>>, AppError> {
    let events = state.store.list_events(&filter).await?;
    Ok(Json(events))
}

#[axum::debug_handler]
pub async fn event_detail(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventDetail>, AppError> {
    // 先探缓存，未命中落库再回填
    if let Some(detail) = cached_event_detail(&state.redis, event_id).await {
        return Ok(Json(detail));
    }

    let detail = state
        .store
        .event_detail(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("event not found"))?;

    store_event_detail(&state.redis, &detail).await;
    Ok(Json(detail))
}

#[axum::debug_handler]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.store.list_categories().await?;
    Ok(Json(categories))
}

#[axum::debug_handler]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<CommentInfo>>, AppError> {
    if state.store.find_event(event_id).await?.is_none() {
        return Err(AppError::not_found("event not found"));
    }
    let comments = state.store.comments_for_event(event_id).await?;
    Ok(Json(comments))
}

#[axum::debug_handler]
pub async fn list_organizations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Organization>>, AppError> {
    let organizations = state.store.list_organizations().await?;
    Ok(Json(organizations))
}

#[axum::debug_handler]
pub async fn get_organization(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
) -> Result<Json<Organization>, AppError> {
    let organization = state
        .store
        .find_organization(org_id)
        .await?
        .ok_or_else(|| AppError::not_found("organization not found"))?;
    Ok(Json(organization))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<PublicUserInfo>, AppError> {
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    Ok(Json(PublicUserInfo::from(user)))
}

#[axum::debug_handler]
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChecklistTemplate>>, AppError> {
    let templates = state.store.list_templates().await?;
    Ok(Json(templates))
}

#[axum::debug_handler]
pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
) -> Result<Json<TemplateDetail>, AppError> {
    let (template, items) = state
        .store
        .find_template(template_id)
        .await?
        .ok_or_else(|| AppError::not_found("template not found"))?;
    Ok(Json(TemplateDetail { template, items }))
}
