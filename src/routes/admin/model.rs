use serde::Deserialize;

use crate::error::AppError;
use crate::model::{Role, User};
use crate::store::{Store, UserStore};

#[derive(Debug, Deserialize)]
pub struct SetRolesRequest {
    pub roles: Vec<Role>,
}

/// 角色全量替换，USER 角色始终保底
pub async fn set_user_roles(
    store: &dyn Store,
    user_id: i64,
    mut roles: Vec<Role>,
) -> Result<User, AppError> {
    if !roles.contains(&Role::User) {
        roles.push(Role::User);
    }
    roles.dedup();
    store.set_roles(user_id, &roles).await
}
