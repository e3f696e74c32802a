use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use redis::AsyncCommands;

use crate::config::Config;
use crate::error::AppError;

/// redis 固定窗口计数限流，按客户端IP
#[derive(Clone)]
pub struct RateLimiter {
    redis: Arc<redis::Client>,
    window_secs: u64,
    quota: u32,
}

impl RateLimiter {
    pub fn new(redis: redis::Client, config: &Config) -> Self {
        Self {
            redis: Arc::new(redis),
            window_secs: config.rate_limit_window_secs,
            quota: config.rate_limit_requests,
        }
    }
}

// 反代头优先，退回连接信息里的对端地址
fn client_ip(req: &Request) -> String {
    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|part| !part.trim().is_empty()))
        })
        .map(|s| s.trim().to_string())
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&req);
    let key = format!("rate:{}", ip);

    let mut conn = limiter.redis.get_multiplexed_async_connection().await?;

    let count: i64 = conn.incr(&key, 1).await?;
    if count == 1 {
        // 窗口里的第一个请求负责设过期
        let _: () = conn.expire(&key, limiter.window_secs as i64).await?;
    }

    if count > limiter.quota as i64 {
        tracing::warn!("rate limit hit for {}", ip);
        return Err(AppError::RateLimited(limiter.window_secs));
    }

    Ok(next.run(req).await)
}
