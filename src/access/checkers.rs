//! 五种资源类型各一个检查器。共性的抽取/分发逻辑在别处，
//! 这里只写每种资源自己的两件事：抽哪些ID、问什么谓词。

use async_trait::async_trait;

use super::{AccessChecker, AccessKind, AccessParams};
use crate::error::AppError;
use crate::store::{CommentStore, EventStore, Store, SubscriptionStore};

/// 活动本体的改删：只有创建者可以
pub struct EventChecker;

struct EventAccess {
    event_id: i64,
    user_id: i64,
}

impl EventChecker {
    fn extract(params: &AccessParams) -> Result<EventAccess, AppError> {
        Ok(EventAccess {
            event_id: params.path_id("event_id")?,
            user_id: params.user_id,
        })
    }
}

#[async_trait]
impl AccessChecker for EventChecker {
    fn kind(&self) -> AccessKind {
        AccessKind::Event
    }

    async fn check(&self, store: &dyn Store, params: &AccessParams) -> Result<bool, AppError> {
        let data = Self::extract(params)?;
        store.is_event_creator(data.event_id, data.user_id).await
    }
}

/// 参与者范围内的操作：主体必须已经是活动参与者
pub struct ParticipantChecker;

struct ParticipantAccess {
    event_id: i64,
    participant_id: i64,
}

impl ParticipantChecker {
    fn extract(params: &AccessParams) -> Result<ParticipantAccess, AppError> {
        Ok(ParticipantAccess {
            event_id: params.path_id("event_id")?,
            participant_id: params.user_id,
        })
    }
}

#[async_trait]
impl AccessChecker for ParticipantChecker {
    fn kind(&self) -> AccessKind {
        AccessKind::Participant
    }

    async fn check(&self, store: &dyn Store, params: &AccessParams) -> Result<bool, AppError> {
        let data = Self::extract(params)?;
        store.is_participant(data.event_id, data.participant_id).await
    }
}

/// 移除参与者：创建者可移除任何人，普通用户只能移除自己
pub struct ParticipantRemovalChecker;

struct ParticipantRemovalAccess {
    event_id: i64,
    participant_id: i64,
    user_id: i64,
}

impl ParticipantRemovalChecker {
    fn extract(params: &AccessParams) -> Result<ParticipantRemovalAccess, AppError> {
        Ok(ParticipantRemovalAccess {
            event_id: params.path_id("event_id")?,
            participant_id: params.path_id("participant_id")?,
            user_id: params.user_id,
        })
    }
}

#[async_trait]
impl AccessChecker for ParticipantRemovalChecker {
    fn kind(&self) -> AccessKind {
        AccessKind::ParticipantRemoval
    }

    async fn check(&self, store: &dyn Store, params: &AccessParams) -> Result<bool, AppError> {
        let data = Self::extract(params)?;
        if data.user_id == data.participant_id {
            return Ok(true);
        }
        store.is_event_creator(data.event_id, data.user_id).await
    }
}

/// 删除评论：(评论, 活动, 作者) 三元组必须存在
pub struct CommentChecker;

struct CommentAccess {
    comment_id: i64,
    event_id: i64,
    user_id: i64,
}

impl CommentChecker {
    fn extract(params: &AccessParams) -> Result<CommentAccess, AppError> {
        Ok(CommentAccess {
            comment_id: params.path_id("comment_id")?,
            event_id: params.query_id("event_id")?,
            user_id: params.user_id,
        })
    }
}

#[async_trait]
impl AccessChecker for CommentChecker {
    fn kind(&self) -> AccessKind {
        AccessKind::Comment
    }

    async fn check(&self, store: &dyn Store, params: &AccessParams) -> Result<bool, AppError> {
        let data = Self::extract(params)?;
        store
            .comment_triple_exists(data.comment_id, data.event_id, data.user_id)
            .await
    }
}

/// 订阅检查：分类ID可空，没给直接判否而不是报错
pub struct SubscriptionChecker;

struct SubscriptionAccess {
    category_id: Option<i64>,
    user_id: i64,
}

impl SubscriptionChecker {
    fn extract(params: &AccessParams) -> Result<SubscriptionAccess, AppError> {
        Ok(SubscriptionAccess {
            category_id: params.optional_query_id("category_id")?,
            user_id: params.user_id,
        })
    }
}

#[async_trait]
impl AccessChecker for SubscriptionChecker {
    fn kind(&self) -> AccessKind {
        AccessKind::Subscription
    }

    async fn check(&self, store: &dyn Store, params: &AccessParams) -> Result<bool, AppError> {
        let data = Self::extract(params)?;
        match data.category_id {
            Some(category_id) => store.is_subscribed(data.user_id, category_id).await,
            None => Ok(false),
        }
    }
}
