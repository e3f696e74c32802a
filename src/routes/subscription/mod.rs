mod handler;
mod model;

pub use handler::{check_subscription, list_subscriptions, subscribe, unsubscribe};
pub use model::SubscriptionStatus;
