use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::{Event, EventDetail, Patch};
use crate::notify::{EmailNotification, Notifier};
use crate::store::{EventChanges, EventStore, NewEvent, Store};

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub schedule_description: Option<String>,
    pub city: String,
    pub street: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// 合并更新：缺省字段不动，日程描述支持显式清除
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub schedule_description: Patch<String>,
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ChangedResponse {
    pub changed: bool,
}

impl Event {
    /// 创建活动：分类 upsert、日程、位置、创建者校验、落库，
    /// 全部成功后再发通知信号（通知不在事务里，失败不影响创建）
    pub async fn create(
        store: &dyn Store,
        notifier: &Notifier,
        req: CreateEventRequest,
        creator_id: i64,
    ) -> Result<EventDetail, AppError> {
        let mut problems = Vec::new();
        if req.name.trim().is_empty() {
            problems.push("name: must not be blank");
        }
        if req.end_time < req.start_time {
            problems.push("end_time: must not precede start_time");
        }
        if req.city.trim().is_empty() {
            problems.push("city: must not be blank");
        }
        if req.street.trim().is_empty() {
            problems.push("street: must not be blank");
        }
        if !problems.is_empty() {
            return Err(AppError::validation(problems.join("; ")));
        }

        let detail = store
            .create_event(NewEvent {
                name: req.name,
                start_time: req.start_time,
                end_time: req.end_time,
                schedule_description: req.schedule_description,
                city: req.city,
                street: req.street,
                category_names: req.categories,
                creator_id,
            })
            .await?;

        notifier.publish(EmailNotification {
            event_name: detail.event.name.clone(),
            category_ids: detail.categories.iter().map(|c| c.id).collect(),
        });

        Ok(detail)
    }

    /// 合并更新。字段给出且与当前值不同才落库；
    /// 空分类集合视同没给；路由守卫之外这里再验一次创建者
    pub async fn update(
        store: &dyn Store,
        event_id: i64,
        req: UpdateEventRequest,
        user_id: i64,
    ) -> Result<EventDetail, AppError> {
        let current = store
            .event_detail(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("event not found"))?;

        if current.event.creator_id != user_id {
            return Err(AppError::access_denied("only the creator may modify an event"));
        }

        let mut changes = EventChanges::default();

        if let Some(name) = req.name {
            if !name.trim().is_empty() && name != current.event.name {
                changes.name = Some(name);
            }
        }
        if let Some(start_time) = req.start_time {
            if start_time != current.event.start_time {
                changes.start_time = Some(start_time);
            }
        }
        if let Some(end_time) = req.end_time {
            if end_time != current.event.end_time {
                changes.end_time = Some(end_time);
            }
        }

        // 更新后的时间窗仍要有效
        let effective_start = changes.start_time.unwrap_or(current.event.start_time);
        let effective_end = changes.end_time.unwrap_or(current.event.end_time);
        if effective_end < effective_start {
            return Err(AppError::validation("end_time: must not precede start_time"));
        }

        let current_description = current
            .schedule
            .as_ref()
            .and_then(|s| s.description.clone());
        changes.schedule_description = match req.schedule_description {
            Patch::Absent => Patch::Absent,
            Patch::Clear if current_description.is_some() => Patch::Clear,
            Patch::Clear => Patch::Absent,
            Patch::Set(description) if Some(&description) != current_description.as_ref() => {
                Patch::Set(description)
            }
            Patch::Set(_) => Patch::Absent,
        };

        if let Some(names) = req.categories {
            if !names.is_empty() {
                let wanted: HashSet<&str> = names.iter().map(|n| n.as_str()).collect();
                let existing: HashSet<&str> =
                    current.categories.iter().map(|c| c.name.as_str()).collect();
                if wanted != existing {
                    // 非空分类集合整体替换
                    changes.category_names = Some(names);
                }
            }
        }

        store.update_event(event_id, changes).await
    }

    pub async fn delete(store: &dyn Store, event_id: i64, user_id: i64) -> Result<(), AppError> {
        let event = store
            .find_event(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("event not found"))?;

        if event.creator_id != user_id {
            return Err(AppError::access_denied("only the creator may delete an event"));
        }

        store.delete_event(event_id).await
    }

    /// 自助加入，重复加入是无害的空操作
    pub async fn join(store: &dyn Store, event_id: i64, user_id: i64) -> Result<bool, AppError> {
        store.add_participant(event_id, user_id).await
    }

    pub async fn leave(store: &dyn Store, event_id: i64, user_id: i64) -> Result<bool, AppError> {
        store.remove_participant(event_id, user_id).await
    }

    /// 移除他人：创建者可移除任何人，其余只能移除自己
    pub async fn remove_participant(
        store: &dyn Store,
        event_id: i64,
        participant_id: i64,
        actor_id: i64,
    ) -> Result<bool, AppError> {
        if actor_id != participant_id && !store.is_event_creator(event_id, actor_id).await? {
            return Err(AppError::access_denied(
                "only the creator may remove other participants",
            ));
        }
        store.remove_participant(event_id, participant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem::MemStore;
    use crate::store::{ChatStore, CommentStore};
    use crate::testing;
    use chrono::{Duration, TimeZone};

    fn create_req(categories: &[&str]) -> CreateEventRequest {
        let start = Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap();
        CreateEventRequest {
            name: "Picnic".to_string(),
            start_time: start,
            end_time: start + Duration::hours(4),
            schedule_description: Some("bring food".to_string()),
            city: "Berlin".to_string(),
            street: "Parkweg 3".to_string(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn create_requires_existing_creator() {
        let store = MemStore::new();
        let (notifier, _rx) = Notifier::channel(8);
        let err = Event::create(&store, &notifier, create_req(&[]), 999)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_validates_time_window() {
        let store = MemStore::new();
        let user = testing::user(&store, "alice").await;
        let (notifier, _rx) = Notifier::channel(8);

        let mut req = create_req(&[]);
        std::mem::swap(&mut req.start_time, &mut req.end_time);

        let err = Event::create(&store, &notifier, req, user.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    /// 同名分类两次创建只留一行，第二次拿到的是已有行的ID
    #[tokio::test]
    async fn category_upsert_is_idempotent() {
        let store = MemStore::new();
        let first = store
            .upsert_categories(&["Music".to_string(), "Food".to_string()])
            .await
            .unwrap();
        let second = store
            .upsert_categories(&["Food".to_string(), "Sport".to_string()])
            .await
            .unwrap();

        let food_first = first.iter().find(|c| c.name == "Food").unwrap();
        let food_second = second.iter().find(|c| c.name == "Food").unwrap();
        assert_eq!(food_first.id, food_second.id);

        let all = store.list_categories().await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn location_upsert_reuses_row() {
        let store = MemStore::new();
        let a = store.upsert_location("Berlin", "Parkweg 3").await.unwrap();
        let b = store.upsert_location("Berlin", "Parkweg 3").await.unwrap();
        let c = store.upsert_location("Berlin", "Other St 1").await.unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    /// 只给 name 的更新不碰时间、日程和分类；空分类集合也不碰分类
    #[tokio::test]
    async fn update_is_a_merge_patch() {
        let store = MemStore::new();
        let user = testing::user(&store, "alice").await;
        let (notifier, _rx) = Notifier::channel(8);
        let detail = Event::create(&store, &notifier, create_req(&["Music"]), user.id)
            .await
            .unwrap();

        let updated = Event::update(
            &store,
            detail.event.id,
            UpdateEventRequest {
                name: Some("Renamed".to_string()),
                categories: Some(vec![]),
                ..Default::default()
            },
            user.id,
        )
        .await
        .unwrap();

        assert_eq!(updated.event.name, "Renamed");
        assert_eq!(updated.event.start_time, detail.event.start_time);
        assert_eq!(updated.event.end_time, detail.event.end_time);
        assert_eq!(
            updated.schedule.as_ref().and_then(|s| s.description.clone()),
            Some("bring food".to_string())
        );
        assert_eq!(updated.categories.len(), 1);
        assert_eq!(updated.categories[0].name, "Music");
    }

    #[tokio::test]
    async fn update_replaces_categories_when_nonempty() {
        let store = MemStore::new();
        let user = testing::user(&store, "alice").await;
        let (notifier, _rx) = Notifier::channel(8);
        let detail = Event::create(&store, &notifier, create_req(&["Music", "Food"]), user.id)
            .await
            .unwrap();

        let updated = Event::update(
            &store,
            detail.event.id,
            UpdateEventRequest {
                categories: Some(vec!["Sport".to_string()]),
                ..Default::default()
            },
            user.id,
        )
        .await
        .unwrap();

        let names: Vec<&str> = updated.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Sport"]);
    }

    /// 显式 null 清掉日程描述，缺省保持
    #[tokio::test]
    async fn schedule_description_clear_vs_absent() {
        let store = MemStore::new();
        let user = testing::user(&store, "alice").await;
        let (notifier, _rx) = Notifier::channel(8);
        let detail = Event::create(&store, &notifier, create_req(&[]), user.id)
            .await
            .unwrap();

        let updated = Event::update(
            &store,
            detail.event.id,
            UpdateEventRequest {
                schedule_description: Patch::Clear,
                ..Default::default()
            },
            user.id,
        )
        .await
        .unwrap();
        assert_eq!(
            updated.schedule.as_ref().and_then(|s| s.description.clone()),
            None
        );
    }

    #[tokio::test]
    async fn update_denied_for_non_creator() {
        let store = MemStore::new();
        let alice = testing::user(&store, "alice").await;
        let mallory = testing::user(&store, "mallory").await;
        let (notifier, _rx) = Notifier::channel(8);
        let detail = Event::create(&store, &notifier, create_req(&[]), alice.id)
            .await
            .unwrap();

        let err = Event::update(
            &store,
            detail.event.id,
            UpdateEventRequest {
                name: Some("Hijacked".to_string()),
                ..Default::default()
            },
            mallory.id,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied(_)));
    }

    /// 加入/退出上报是否真的发生了变化，重复操作是无害空操作
    #[tokio::test]
    async fn join_and_leave_report_changes() {
        let store = MemStore::new();
        let alice = testing::user(&store, "alice").await;
        let bob = testing::user(&store, "bob").await;
        let (notifier, _rx) = Notifier::channel(8);
        let detail = Event::create(&store, &notifier, create_req(&[]), alice.id)
            .await
            .unwrap();
        let event_id = detail.event.id;

        assert!(Event::join(&store, event_id, bob.id).await.unwrap());
        assert!(!Event::join(&store, event_id, bob.id).await.unwrap());
        assert!(store.is_participant(event_id, bob.id).await.unwrap());

        assert!(Event::leave(&store, event_id, bob.id).await.unwrap());
        assert!(!Event::leave(&store, event_id, bob.id).await.unwrap());
    }

    #[tokio::test]
    async fn removal_rules_creator_or_self() {
        let store = MemStore::new();
        let alice = testing::user(&store, "alice").await;
        let bob = testing::user(&store, "bob").await;
        let carol = testing::user(&store, "carol").await;
        let (notifier, _rx) = Notifier::channel(8);
        let detail = Event::create(&store, &notifier, create_req(&[]), alice.id)
            .await
            .unwrap();
        let event_id = detail.event.id;
        Event::join(&store, event_id, bob.id).await.unwrap();
        Event::join(&store, event_id, carol.id).await.unwrap();

        // 普通参与者不能移除别人
        let err = Event::remove_participant(&store, event_id, bob.id, carol.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied(_)));

        // 自己移除自己可以
        assert!(
            Event::remove_participant(&store, event_id, carol.id, carol.id)
                .await
                .unwrap()
        );
        // 创建者移除任何人可以
        assert!(
            Event::remove_participant(&store, event_id, bob.id, alice.id)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn delete_cascades_to_children() {
        let store = MemStore::new();
        let alice = testing::user(&store, "alice").await;
        let (notifier, _rx) = Notifier::channel(8);
        let detail = Event::create(&store, &notifier, create_req(&[]), alice.id)
            .await
            .unwrap();
        let event_id = detail.event.id;
        Event::join(&store, event_id, alice.id).await.unwrap();
        store
            .insert_comment(event_id, alice.id, "see you there")
            .await
            .unwrap();
        store
            .insert_message(event_id, alice.id, "hello")
            .await
            .unwrap();

        Event::delete(&store, event_id, alice.id).await.unwrap();

        assert!(store.find_event(event_id).await.unwrap().is_none());
        assert!(store.comments_for_event(event_id).await.unwrap().is_empty());
        assert!(
            store
                .messages_for_event(event_id, 50)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
