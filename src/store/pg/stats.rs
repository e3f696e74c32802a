use async_trait::async_trait;

use super::PgStore;
use crate::error::AppError;
use crate::model::Statistics;
use crate::store::StatsStore;

async fn count(pool: &sqlx::PgPool, table: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
}

#[async_trait]
impl StatsStore for PgStore {
    async fn statistics(&self) -> Result<Statistics, AppError> {
        Ok(Statistics {
            users: count(&self.pool, "users").await?,
            events: count(&self.pool, "events").await?,
            comments: count(&self.pool, "comments").await?,
            chat_messages: count(&self.pool, "chat_messages").await?,
            tasks: count(&self.pool, "tasks").await?,
            checklist_items: count(&self.pool, "checklist_items").await?,
            organizations: count(&self.pool, "organizations").await?,
        })
    }
}
