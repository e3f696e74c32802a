use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// 应用统一错误类型，服务层抛出领域错误，由 IntoResponse 统一翻译成 HTTP 响应
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    timestamp: DateTime<Utc>,
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn access_denied(why: impl Into<String>) -> Self {
        AppError::AccessDenied(why.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::AccessDenied(msg) => (StatusCode::FORBIDDEN, "ACCESS_DENIED", msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "ALREADY_EXISTS", msg),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "missing or invalid token".to_string(),
            ),
            AppError::RateLimited(secs) => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("too many requests, retry after {}s", secs),
            ),
            // 内部错误只返回关联ID，细节记录在服务端日志
            AppError::Database(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                log_internal(&format!("database error: {}", e)),
            ),
            AppError::Redis(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                log_internal(&format!("cache error: {}", e)),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                log_internal(&msg),
            ),
        };

        let body = Json(ErrorBody {
            code,
            message,
            timestamp: Utc::now(),
        });

        (status, body).into_response()
    }
}

fn log_internal(detail: &str) -> String {
    let correlation_id = uuid::Uuid::new_v4();
    tracing::error!("internal error [{}]: {}", correlation_id, detail);
    format!("internal error, reference {}", correlation_id)
}
