use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::AppError;
use crate::model::Role;
use crate::utils::Claims;

/// 管理端路由的角色门。比资源级检查粗，先于它执行
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(AppError::Unauthorized)?;

    if !claims.has_role(Role::Admin) {
        tracing::warn!("non-admin user {} hit admin route", claims.sub);
        return Err(AppError::access_denied("admin role required"));
    }

    Ok(next.run(req).await)
}
