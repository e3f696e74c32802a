use serde::Deserialize;

use crate::error::AppError;
use crate::model::Image;
use crate::store::{ChatStore, EventStore, ImageStore, NewImage, Store};

/// 文件本体由外部存储服务收走，这里只登记元数据。
/// 三个归属引用最多填一个，填哪个决定图片挂在谁身上。
#[derive(Debug, Deserialize)]
pub struct RegisterImageRequest {
    pub filename: String,
    pub original_filename: String,
    pub content_type: String,
    pub size: i64,
    pub file_path: String,
    pub user_id: Option<i64>,
    pub event_id: Option<i64>,
    pub message_id: Option<i64>,
}

/// 归属权核验：头像只能挂自己，活动图要是活动创建者，消息图要是消息作者
async fn ensure_ownership_rights(
    store: &dyn Store,
    req: &RegisterImageRequest,
    caller_id: i64,
) -> Result<(), AppError> {
    if let Some(user_id) = req.user_id {
        if user_id != caller_id {
            return Err(AppError::access_denied("cannot set another user's avatar"));
        }
    }
    if let Some(event_id) = req.event_id {
        let event = store
            .find_event(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("event not found"))?;
        if event.creator_id != caller_id {
            return Err(AppError::access_denied(
                "only the creator may attach images to an event",
            ));
        }
    }
    if let Some(message_id) = req.message_id {
        let message = store
            .find_message(message_id)
            .await?
            .ok_or_else(|| AppError::not_found("message not found"))?;
        if message.author_id != caller_id {
            return Err(AppError::access_denied(
                "only the author may attach images to a message",
            ));
        }
    }
    Ok(())
}

impl Image {
    pub async fn register(
        store: &dyn Store,
        req: RegisterImageRequest,
        caller_id: i64,
    ) -> Result<Image, AppError> {
        let owners =
            [req.user_id.is_some(), req.event_id.is_some(), req.message_id.is_some()]
                .iter()
                .filter(|set| **set)
                .count();
        if owners != 1 {
            return Err(AppError::validation(
                "owner: exactly one of user_id, event_id, message_id required",
            ));
        }
        if req.filename.trim().is_empty() || req.file_path.trim().is_empty() {
            return Err(AppError::validation("filename/file_path: must not be blank"));
        }

        ensure_ownership_rights(store, &req, caller_id).await?;

        store
            .insert_image(NewImage {
                filename: req.filename,
                original_filename: req.original_filename,
                content_type: req.content_type,
                size: req.size,
                file_path: req.file_path,
                user_id: req.user_id,
                event_id: req.event_id,
                message_id: req.message_id,
            })
            .await
    }

    pub async fn remove(store: &dyn Store, image_id: i64, caller_id: i64) -> Result<(), AppError> {
        let image = store
            .find_image(image_id)
            .await?
            .ok_or_else(|| AppError::not_found("image not found"))?;

        let allowed = match (image.user_id, image.event_id, image.message_id) {
            (Some(user_id), _, _) => user_id == caller_id,
            (_, Some(event_id), _) => store.is_event_creator(event_id, caller_id).await?,
            (_, _, Some(message_id)) => store
                .find_message(message_id)
                .await?
                .is_some_and(|m| m.author_id == caller_id),
            _ => false,
        };
        if !allowed {
            return Err(AppError::access_denied("not the owner of this image"));
        }

        store.delete_image(image_id).await
    }
}
