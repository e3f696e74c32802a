use std::collections::HashMap;

use axum::{
    Extension, Router,
    extract::{Query, RawPathParams, Request, State},
    middleware::{self, Next},
    response::Response,
};

use super::{AccessKind, AccessParams};
use crate::AppState;
use crate::error::AppError;
use crate::utils::Claims;

/// 守卫中间件。路由上挂的 `AccessKind` 扩展声明资源类型，
/// 这里按标签分发到检查器，不通过就不进处理器。
pub async fn guard(
    State(state): State<AppState>,
    raw_path: RawPathParams,
    Query(query): Query<HashMap<String, String>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let kind = *req
        .extensions()
        .get::<AccessKind>()
        .ok_or_else(|| AppError::Internal("route missing access kind tag".to_string()))?;

    // 认证中间件在外层，Claims 一定已经就位
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(AppError::Unauthorized)?;

    let path: HashMap<String, String> = raw_path
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let params = AccessParams::new(path, query, claims.sub);

    state
        .access
        .authorize(kind, state.store.as_ref(), &params)
        .await?;

    Ok(next.run(req).await)
}

/// 给一组路由声明资源类型标签并挂上守卫
pub fn protect(router: Router<AppState>, state: &AppState, kind: AccessKind) -> Router<AppState> {
    router
        .route_layer(middleware::from_fn_with_state(state.clone(), guard))
        .route_layer(Extension(kind))
}
