use serde::Serialize;

use crate::error::AppError;
use crate::model::Category;
use crate::store::{Store, SubscriptionStore};

#[derive(Debug, Serialize)]
pub struct SubscriptionStatus {
    pub category_id: i64,
    pub subscribed: bool,
}

pub async fn subscribe(
    store: &dyn Store,
    user_id: i64,
    category_id: i64,
) -> Result<bool, AppError> {
    store.subscribe(user_id, category_id).await
}

pub async fn unsubscribe(
    store: &dyn Store,
    user_id: i64,
    category_id: i64,
) -> Result<bool, AppError> {
    store.unsubscribe(user_id, category_id).await
}

pub async fn status(
    store: &dyn Store,
    user_id: i64,
    category_id: i64,
) -> Result<SubscriptionStatus, AppError> {
    Ok(SubscriptionStatus {
        category_id,
        subscribed: store.is_subscribed(user_id, category_id).await?,
    })
}

pub async fn subscriptions(store: &dyn Store, user_id: i64) -> Result<Vec<Category>, AppError> {
    store.subscriptions_of(user_id).await
}
