//! 测试夹具：内存存储上的常用数据构造和一个记录型邮件客户端

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use crate::error::AppError;
use crate::model::{EventDetail, Role, User};
use crate::notify::Mailer;
use crate::store::{EventStore, NewEvent, NewUser, Store, UserStore};

pub async fn user(store: &dyn Store, name: &str) -> User {
    store
        .insert_user(NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            // 密码散列与登录无关的测试不需要真实 bcrypt
            password_hash: "!".to_string(),
            roles: vec![Role::User],
        })
        .await
        .expect("fixture user")
}

pub async fn org_owner(store: &dyn Store, name: &str) -> User {
    store
        .insert_user(NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "!".to_string(),
            roles: vec![Role::User, Role::OrganizationOwner],
        })
        .await
        .expect("fixture owner")
}

pub async fn event(store: &dyn Store, creator_id: i64, categories: &[&str]) -> EventDetail {
    let start = Utc.with_ymd_and_hms(2026, 10, 1, 19, 0, 0).unwrap();
    store
        .create_event(NewEvent {
            name: "Fixture event".to_string(),
            start_time: start,
            end_time: start + Duration::hours(3),
            schedule_description: None,
            city: "Berlin".to_string(),
            street: "Teststr. 1".to_string(),
            category_names: categories.iter().map(|s| s.to_string()).collect(),
            creator_id,
        })
        .await
        .expect("fixture event")
}

pub async fn join(store: &dyn Store, event_id: i64, user_id: i64) {
    store
        .add_participant(event_id, user_id)
        .await
        .expect("fixture join");
}

/// 记录发出的邮件；fail 为真时每次投递都失败
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::Internal("mail gateway unreachable".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}
