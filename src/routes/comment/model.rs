use serde::Deserialize;

use crate::error::AppError;
use crate::model::Comment;
use crate::store::{CommentStore, EventStore, Store};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub event_id: i64,
    pub text: String,
}

impl Comment {
    /// 发评论只要登录即可，不要求参与活动
    pub async fn create(
        store: &dyn Store,
        user_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment, AppError> {
        if req.text.trim().is_empty() {
            return Err(AppError::validation("text: must not be blank"));
        }
        if store.find_event(req.event_id).await?.is_none() {
            return Err(AppError::not_found("event not found"));
        }

        store.insert_comment(req.event_id, user_id, &req.text).await
    }

    /// 删评论按 (评论, 活动, 作者) 三元组判权，不走一般的参与判定
    pub async fn delete(
        store: &dyn Store,
        comment_id: i64,
        event_id: i64,
        user_id: i64,
    ) -> Result<(), AppError> {
        if !store
            .comment_triple_exists(comment_id, event_id, user_id)
            .await?
        {
            return Err(AppError::access_denied(
                "only the author may delete a comment",
            ));
        }

        store.delete_comment(comment_id).await
    }
}
