use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::AppError;
use crate::model::Organization;
use crate::utils::Claims;

use super::model::{CreateOrganizationRequest, UpdateOrganizationRequest};

#[axum::debug_handler]
pub async fn create_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Organization>), AppError> {
    let organization = Organization::create(state.store.as_ref(), req, claims.sub).await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

#[axum::debug_handler]
pub async fn update_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(org_id): Path<i64>,
    Json(req): Json<UpdateOrganizationRequest>,
) -> Result<Json<Organization>, AppError> {
    let organization =
        Organization::update(state.store.as_ref(), org_id, req, claims.sub).await?;
    Ok(Json(organization))
}

#[axum::debug_handler]
pub async fn delete_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(org_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    Organization::delete(state.store.as_ref(), org_id, claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}
