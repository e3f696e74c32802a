use async_trait::async_trait;

use super::PgStore;
use crate::error::AppError;
use crate::model::{Comment, CommentInfo};
use crate::store::CommentStore;

#[async_trait]
impl CommentStore for PgStore {
    async fn insert_comment(
        &self,
        event_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (event_id, user_id, text, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, event_id, user_id, text, created_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn comment_triple_exists(
        &self,
        comment_id: i64,
        event_id: i64,
        user_id: i64,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM comments
                WHERE id = $1 AND event_id = $2 AND user_id = $3
            )
            "#,
        )
        .bind(comment_id)
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn delete_comment(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("comment not found"));
        }
        Ok(())
    }

    async fn comments_for_event(&self, event_id: i64) -> Result<Vec<CommentInfo>, AppError> {
        let comments = sqlx::query_as::<_, CommentInfo>(
            r#"
            SELECT c.id, c.event_id, c.user_id, u.username, c.text, c.created_at
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.event_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
