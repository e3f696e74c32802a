use async_trait::async_trait;

use super::PgStore;
use crate::error::AppError;
use crate::model::Category;
use crate::store::SubscriptionStore;

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn subscribe(&self, user_id: i64, category_id: i64) -> Result<bool, AppError> {
        let category_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;
        if !category_exists {
            return Err(AppError::not_found("category not found"));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO user_subscriptions (user_id, category_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, category_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn unsubscribe(&self, user_id: i64, category_id: i64) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM user_subscriptions WHERE user_id = $1 AND category_id = $2")
                .bind(user_id)
                .bind(category_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_subscribed(&self, user_id: i64, category_id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_subscriptions
                WHERE user_id = $1 AND category_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn subscriptions_of(&self, user_id: i64) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name
            FROM categories c
            JOIN user_subscriptions s ON s.category_id = c.id
            WHERE s.user_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn subscriber_emails(&self, category_ids: &[i64]) -> Result<Vec<String>, AppError> {
        let emails: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT u.email
            FROM users u
            JOIN user_subscriptions s ON s.user_id = u.id
            WHERE s.category_id = ANY($1)
            "#,
        )
        .bind(category_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(emails)
    }
}
