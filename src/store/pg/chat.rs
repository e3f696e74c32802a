use async_trait::async_trait;

use super::PgStore;
use crate::error::AppError;
use crate::model::{ChatMessage, ChatMessageInfo};
use crate::store::ChatStore;

const MESSAGE_COLUMNS: &str = "id, event_id, author_id, content, edited, created_at";

#[async_trait]
impl ChatStore for PgStore {
    async fn insert_message(
        &self,
        event_id: i64,
        author_id: i64,
        content: &str,
    ) -> Result<ChatMessage, AppError> {
        let message = sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            INSERT INTO chat_messages (event_id, author_id, content, edited, created_at)
            VALUES ($1, $2, $3, false, NOW())
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_message(&self, id: i64) -> Result<Option<ChatMessage>, AppError> {
        let message = sqlx::query_as::<_, ChatMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    async fn update_message(&self, id: i64, content: &str) -> Result<ChatMessage, AppError> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            UPDATE chat_messages
            SET content = $2, edited = true
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("message not found"))
    }

    async fn delete_message(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("message not found"));
        }
        Ok(())
    }

    async fn messages_for_event(
        &self,
        event_id: i64,
        limit: i64,
    ) -> Result<Vec<ChatMessageInfo>, AppError> {
        // 连用户表带出昵称，新消息在前
        let messages = sqlx::query_as::<_, ChatMessageInfo>(
            r#"
            SELECT m.id, m.event_id, m.author_id, u.username, m.content, m.edited, m.created_at
            FROM chat_messages m
            JOIN users u ON m.author_id = u.id
            WHERE m.event_id = $1
            ORDER BY m.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(event_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
