use std::sync::Arc;

use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client as RedisClient};
use serde::{Deserialize, Serialize};

use crate::model::{EventDetail, User};

// 公开活动详情的缓存参数
const EVENT_CACHE_EXPIRE: u64 = 600; // 缓存过期时间，单位秒
const EVENT_CACHE_PREFIX: &str = "event:detail:"; // 活动详情缓存前缀

/// 公开的用户信息，不含邮箱和凭据
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUserInfo {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

fn cache_key(event_id: i64) -> String {
    format!("{}{}", EVENT_CACHE_PREFIX, event_id)
}

/// 缓存读，redis 不可用时静默落库
pub(super) async fn cached_event_detail(
    redis: &Arc<RedisClient>,
    event_id: i64,
) -> Option<EventDetail> {
    let key = cache_key(event_id);
    if let Ok(mut conn) = redis.get_multiplexed_async_connection().await {
        let cached: redis::RedisResult<String> = conn.get(&key).await;
        if let Ok(json_str) = cached {
            if let Ok(detail) = serde_json::from_str::<EventDetail>(&json_str) {
                tracing::debug!("event detail from cache: {}", key);
                return Some(detail);
            }
        }
    }
    None
}

pub(super) async fn store_event_detail(redis: &Arc<RedisClient>, detail: &EventDetail) {
    let key = cache_key(detail.event.id);
    if let Ok(mut conn) = redis.get_multiplexed_async_connection().await {
        if let Ok(json_str) = serde_json::to_string(detail) {
            let _: Result<(), redis::RedisError> =
                conn.set_ex(&key, json_str, EVENT_CACHE_EXPIRE).await;
            tracing::debug!("event detail cached: {}", key);
        }
    }
}

/// 活动或参与者变了就清缓存
pub async fn invalidate_event_cache(redis: &Arc<RedisClient>, event_id: i64) {
    if let Ok(mut conn) = redis.get_multiplexed_async_connection().await {
        let _: Result<(), redis::RedisError> = conn.del(&cache_key(event_id)).await;
    }
}
