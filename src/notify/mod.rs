//! 活动创建后的邮件通知扇出。
//!
//! 发布端只往有界队列里投递一个信号就返回，绝不阻塞创建请求；
//! 独立的 worker 任务消费队列，按分类查订阅者邮箱，逐个发信。
//! 查询或投递失败只记日志，永远不回传给触发请求。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::store::{Store, SubscriptionStore};

/// 固定的通知标题，正文套入活动名
const MAIL_SUBJECT: &str = "新活动通知";

fn mail_body(event_name: &str) -> String {
    format!("活动「{}」已发布，快来看看吧。", event_name)
}

/// 活动创建时发出的信号
#[derive(Debug, Clone)]
pub struct EmailNotification {
    pub event_name: String,
    pub category_ids: Vec<i64>,
}

/// 发布端。队列满了丢弃并记警告，不等待
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<EmailNotification>,
}

impl Notifier {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EmailNotification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn publish(&self, notification: EmailNotification) {
        if let Err(e) = self.tx.try_send(notification) {
            tracing::warn!("notification dropped: {}", e);
        }
    }
}

/// 邮件投递是外部协作方，这里只有一个简单契约
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

#[derive(Serialize)]
struct OutboundMail<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// 把邮件 POST 给网关服务
pub struct GatewayMailer {
    client: reqwest::Client,
    endpoint: String,
}

impl GatewayMailer {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Mailer for GatewayMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        self.client
            .post(&self.endpoint)
            .json(&OutboundMail { to, subject, body })
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AppError::Internal(format!("mail gateway error: {}", e)))?;
        Ok(())
    }
}

/// worker 任务入口，随服务启动
pub async fn run_worker(
    mut rx: mpsc::Receiver<EmailNotification>,
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
) {
    while let Some(notification) = rx.recv().await {
        fan_out(store.as_ref(), mailer.as_ref(), &notification).await;
    }
    tracing::info!("notification worker stopped");
}

/// 一次扇出：每个去重后的订阅者一封，尽力投递
pub async fn fan_out(store: &dyn Store, mailer: &dyn Mailer, notification: &EmailNotification) {
    let emails = match store.subscriber_emails(&notification.category_ids).await {
        Ok(emails) => emails,
        Err(e) => {
            tracing::error!("subscriber lookup failed: {}", e);
            return;
        }
    };

    let body = mail_body(&notification.event_name);
    for email in emails {
        if let Err(e) = mailer.send(&email, MAIL_SUBJECT, &body).await {
            tracing::error!("mail delivery to {} failed: {}", email, e);
        }
    }
}
