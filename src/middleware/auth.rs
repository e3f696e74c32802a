use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};

use crate::AppState;
use crate::error::AppError;
use crate::utils::verify_token;

/// Bearer token 校验，通过后把 Claims 放进请求扩展，
/// 后续的角色门和资源守卫都从这里拿主体身份
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(TypedHeader(Authorization(bearer))) = auth else {
        return Err(AppError::Unauthorized);
    };

    let claims = verify_token(bearer.token(), &state.config).map_err(|e| {
        tracing::debug!("token rejected: {}", e);
        AppError::Unauthorized
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
