use serde::Deserialize;

use crate::error::AppError;
use crate::model::{Organization, Patch, Role};
use crate::store::{NewOrganization, OrganizationChanges, OrganizationStore, Store, UserStore};

#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
}

impl Organization {
    /// 创建组织要求 ORGANIZATION_OWNER 角色，从存储里现查（令牌里的
    /// 角色可能已经过期）
    pub async fn create(
        store: &dyn Store,
        req: CreateOrganizationRequest,
        user_id: i64,
    ) -> Result<Organization, AppError> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("name: must not be blank"));
        }

        let user = store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;
        if !user.roles.contains(&Role::OrganizationOwner) {
            return Err(AppError::access_denied(
                "organization owner role required",
            ));
        }

        store
            .insert_organization(NewOrganization {
                name: req.name,
                description: req.description,
                owner_id: user_id,
            })
            .await
    }

    pub async fn update(
        store: &dyn Store,
        org_id: i64,
        req: UpdateOrganizationRequest,
        user_id: i64,
    ) -> Result<Organization, AppError> {
        let organization = store
            .find_organization(org_id)
            .await?
            .ok_or_else(|| AppError::not_found("organization not found"))?;
        if organization.owner_id != user_id {
            return Err(AppError::access_denied(
                "only the owner may modify an organization",
            ));
        }

        store
            .update_organization(
                org_id,
                OrganizationChanges {
                    name: req.name,
                    description: req.description,
                },
            )
            .await
    }

    pub async fn delete(store: &dyn Store, org_id: i64, user_id: i64) -> Result<(), AppError> {
        let organization = store
            .find_organization(org_id)
            .await?
            .ok_or_else(|| AppError::not_found("organization not found"))?;
        if organization.owner_id != user_id {
            return Err(AppError::access_denied(
                "only the owner may delete an organization",
            ));
        }

        store.delete_organization(org_id).await
    }
}
