use serde::Deserialize;

use crate::error::AppError;
use crate::model::{ChatMessage, ChatMessageInfo};
use crate::store::{ChatStore, EventStore, Store};

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessageRequest {
    pub content: String,
}

impl ChatMessage {
    /// 发消息：路由守卫已经验过参与者，这里便宜再验一次
    pub async fn create(
        store: &dyn Store,
        event_id: i64,
        author_id: i64,
        req: CreateMessageRequest,
    ) -> Result<ChatMessage, AppError> {
        if req.content.trim().is_empty() {
            return Err(AppError::validation("content: must not be blank"));
        }
        if store.find_event(event_id).await?.is_none() {
            return Err(AppError::not_found("event not found"));
        }
        if !store.is_participant(event_id, author_id).await? {
            return Err(AppError::access_denied("only participants may post messages"));
        }

        store.insert_message(event_id, author_id, &req.content).await
    }

    /// 只有作者能改自己的消息，活动创建者也不行
    pub async fn update(
        store: &dyn Store,
        message_id: i64,
        user_id: i64,
        req: UpdateMessageRequest,
    ) -> Result<ChatMessage, AppError> {
        if req.content.trim().is_empty() {
            return Err(AppError::validation("content: must not be blank"));
        }
        let message = store
            .find_message(message_id)
            .await?
            .ok_or_else(|| AppError::not_found("message not found"))?;
        if message.author_id != user_id {
            return Err(AppError::access_denied("only the author may edit a message"));
        }

        store.update_message(message_id, &req.content).await
    }

    pub async fn delete(store: &dyn Store, message_id: i64, user_id: i64) -> Result<(), AppError> {
        let message = store
            .find_message(message_id)
            .await?
            .ok_or_else(|| AppError::not_found("message not found"))?;
        if message.author_id != user_id {
            return Err(AppError::access_denied("only the author may delete a message"));
        }

        store.delete_message(message_id).await
    }

    pub async fn list(
        store: &dyn Store,
        event_id: i64,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<ChatMessageInfo>, AppError> {
        if !store.is_participant(event_id, user_id).await? {
            return Err(AppError::access_denied("only participants may read the chat"));
        }

        store.messages_for_event(event_id, limit).await
    }
}
