//! 内存存储，仅测试用。一把写锁保证多步写操作的原子性，
//! 语义与 Postgres 实现保持一致（Conflict/NotFound/upsert/级联删除）。

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::AppError;
use crate::model::{
    Category, ChatMessage, ChatMessageInfo, ChecklistItem, ChecklistTemplate, Comment, CommentInfo,
    Event, EventDetail, EventFilter, EventInfo, Image, Location, Organization, Patch, Role,
    Schedule, Statistics, Task, TemplateItem, User,
};
use crate::store::{
    ChatStore, ChecklistItemChanges, ChecklistStore, CommentStore, EventChanges, EventStore,
    ImageStore, NewChecklistItem, NewEvent, NewImage, NewOrganization, NewTask, NewTemplate,
    NewUser, OrganizationChanges, OrganizationStore, ProfileChanges, StatsStore,
    SubscriptionStore, TaskChanges, TaskStore, TemplateChanges, TemplateStore, UserStore,
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, User>,
    events: BTreeMap<i64, Event>,
    locations: BTreeMap<i64, Location>,
    schedules: BTreeMap<i64, Schedule>,
    categories: BTreeMap<i64, Category>,
    event_categories: BTreeSet<(i64, i64)>,
    participants: BTreeSet<(i64, i64)>,
    subscriptions: BTreeSet<(i64, i64)>,
    messages: BTreeMap<i64, ChatMessage>,
    comments: BTreeMap<i64, Comment>,
    tasks: BTreeMap<i64, Task>,
    items: BTreeMap<i64, ChecklistItem>,
    templates: BTreeMap<i64, ChecklistTemplate>,
    template_items: BTreeMap<i64, TemplateItem>,
    images: BTreeMap<i64, Image>,
    organizations: BTreeMap<i64, Organization>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn upsert_category(&mut self, name: &str) -> Category {
        if let Some(existing) = self.categories.values().find(|c| c.name == name) {
            return existing.clone();
        }
        let category = Category {
            id: self.next_id(),
            name: name.to_string(),
        };
        self.categories.insert(category.id, category.clone());
        category
    }

    fn upsert_location(&mut self, city: &str, street: &str) -> Location {
        if let Some(existing) = self
            .locations
            .values()
            .find(|l| l.city == city && l.street == street)
        {
            return existing.clone();
        }
        let location = Location {
            id: self.next_id(),
            city: city.to_string(),
            street: street.to_string(),
        };
        self.locations.insert(location.id, location.clone());
        location
    }

    fn detail(&self, event: &Event) -> EventDetail {
        let location = self.locations[&event.location_id].clone();
        let schedule = event.schedule_id.and_then(|id| self.schedules.get(&id).cloned());
        let mut categories: Vec<Category> = self
            .event_categories
            .iter()
            .filter(|(event_id, _)| *event_id == event.id)
            .filter_map(|(_, category_id)| self.categories.get(category_id).cloned())
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        let participant_ids = self
            .participants
            .iter()
            .filter(|(event_id, _)| *event_id == event.id)
            .map(|(_, user_id)| *user_id)
            .collect();
        EventDetail {
            event: event.clone(),
            location,
            schedule,
            categories,
            participant_ids,
        }
    }
}

pub struct MemStore {
    inner: RwLock<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemStore {
    async fn insert_user(&self, new: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.write().unwrap();
        if inner
            .users
            .values()
            .any(|u| u.username == new.username || u.email == new.email)
        {
            return Err(AppError::conflict("username or email already taken"));
        }
        let user = User {
            id: inner.next_id(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            roles: new.roles,
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().unwrap().users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<User, AppError> {
        let mut inner = self.inner.write().unwrap();
        let taken = inner.users.values().any(|u| {
            u.id != id
                && (changes.username.as_deref() == Some(u.username.as_str())
                    || changes.email.as_deref() == Some(u.email.as_str()))
        });
        if taken {
            return Err(AppError::conflict("username or email already taken"));
        }
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("user not found"))?;
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        Ok(user.clone())
    }

    async fn set_roles(&self, id: i64, roles: &[Role]) -> Result<User, AppError> {
        let mut inner = self.inner.write().unwrap();
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("user not found"))?;
        user.roles = roles.to_vec();
        Ok(user.clone())
    }
}

#[async_trait]
impl EventStore for MemStore {
    async fn create_event(&self, new: NewEvent) -> Result<EventDetail, AppError> {
        let mut inner = self.inner.write().unwrap();

        // 与 Postgres 实现相同的顺序：分类、日程、位置、创建者、活动、关联
        let categories: Vec<Category> = new
            .category_names
            .iter()
            .map(|name| inner.upsert_category(name))
            .collect();

        let schedule = new.schedule_description.as_ref().map(|description| {
            let schedule = Schedule {
                id: inner.next_id(),
                description: Some(description.clone()),
            };
            inner.schedules.insert(schedule.id, schedule.clone());
            schedule
        });

        let location = inner.upsert_location(&new.city, &new.street);

        if !inner.users.contains_key(&new.creator_id) {
            return Err(AppError::not_found("creator not found"));
        }

        let event = Event {
            id: inner.next_id(),
            name: new.name,
            start_time: new.start_time,
            end_time: new.end_time,
            creator_id: new.creator_id,
            location_id: location.id,
            schedule_id: schedule.as_ref().map(|s| s.id),
            created_at: Utc::now(),
        };
        inner.events.insert(event.id, event.clone());

        for category in &categories {
            inner.event_categories.insert((event.id, category.id));
        }

        Ok(EventDetail {
            event,
            location,
            schedule,
            categories,
            participant_ids: Vec::new(),
        })
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>, AppError> {
        Ok(self.inner.read().unwrap().events.get(&id).cloned())
    }

    async fn event_detail(&self, id: i64) -> Result<Option<EventDetail>, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.events.get(&id).map(|event| inner.detail(event)))
    }

    async fn update_event(&self, id: i64, changes: EventChanges) -> Result<EventDetail, AppError> {
        let mut inner = self.inner.write().unwrap();

        if !inner.events.contains_key(&id) {
            return Err(AppError::not_found("event not found"));
        }

        if let Some(name) = changes.name {
            inner.events.get_mut(&id).unwrap().name = name;
        }
        if let Some(start_time) = changes.start_time {
            inner.events.get_mut(&id).unwrap().start_time = start_time;
        }
        if let Some(end_time) = changes.end_time {
            inner.events.get_mut(&id).unwrap().end_time = end_time;
        }

        match changes.schedule_description {
            Patch::Absent => {}
            Patch::Clear => {
                if let Some(schedule_id) = inner.events[&id].schedule_id {
                    if let Some(schedule) = inner.schedules.get_mut(&schedule_id) {
                        schedule.description = None;
                    }
                }
            }
            Patch::Set(description) => match inner.events[&id].schedule_id {
                Some(schedule_id) => {
                    inner.schedules.get_mut(&schedule_id).unwrap().description =
                        Some(description);
                }
                None => {
                    let schedule = Schedule {
                        id: inner.next_id(),
                        description: Some(description),
                    };
                    let schedule_id = schedule.id;
                    inner.schedules.insert(schedule_id, schedule);
                    inner.events.get_mut(&id).unwrap().schedule_id = Some(schedule_id);
                }
            },
        }

        if let Some(names) = changes.category_names {
            let categories: Vec<Category> =
                names.iter().map(|name| inner.upsert_category(name)).collect();
            inner.event_categories.retain(|(event_id, _)| *event_id != id);
            for category in &categories {
                inner.event_categories.insert((id, category.id));
            }
        }

        let event = inner.events[&id].clone();
        Ok(inner.detail(&event))
    }

    async fn delete_event(&self, id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.write().unwrap();
        let Some(event) = inner.events.remove(&id) else {
            return Err(AppError::not_found("event not found"));
        };

        // 级联删除，与外键行为一致
        if let Some(schedule_id) = event.schedule_id {
            inner.schedules.remove(&schedule_id);
        }
        inner.event_categories.retain(|(event_id, _)| *event_id != id);
        inner.participants.retain(|(event_id, _)| *event_id != id);
        inner.messages.retain(|_, m| m.event_id != id);
        inner.comments.retain(|_, c| c.event_id != id);
        inner.tasks.retain(|_, t| t.event_id != id);
        inner.items.retain(|_, i| i.event_id != id);
        inner.images.retain(|_, i| i.event_id != Some(id));
        Ok(())
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventInfo>, AppError> {
        let inner = self.inner.read().unwrap();
        let mut infos: Vec<EventInfo> = inner
            .events
            .values()
            .filter(|event| {
                let location = &inner.locations[&event.location_id];
                let category_ids: Vec<i64> = inner
                    .event_categories
                    .iter()
                    .filter(|(event_id, _)| *event_id == event.id)
                    .map(|(_, category_id)| *category_id)
                    .collect();
                filter.matches(event, &location.city, &location.street, &category_ids)
            })
            .map(|event| {
                let location = &inner.locations[&event.location_id];
                EventInfo {
                    id: event.id,
                    name: event.name.clone(),
                    start_time: event.start_time,
                    end_time: event.end_time,
                    creator_id: event.creator_id,
                    city: location.city.clone(),
                    street: location.street.clone(),
                }
            })
            .collect();
        infos.sort_by_key(|info| info.start_time);
        Ok(infos)
    }

    async fn events_created_by(&self, user_id: i64) -> Result<Vec<Event>, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .events
            .values()
            .filter(|e| e.creator_id == user_id)
            .cloned()
            .collect())
    }

    async fn events_joined_by(&self, user_id: i64) -> Result<Vec<Event>, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .events
            .values()
            .filter(|e| inner.participants.contains(&(e.id, user_id)))
            .cloned()
            .collect())
    }

    async fn is_event_creator(&self, event_id: i64, user_id: i64) -> Result<bool, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .events
            .get(&event_id)
            .is_some_and(|e| e.creator_id == user_id))
    }

    async fn is_participant(&self, event_id: i64, user_id: i64) -> Result<bool, AppError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .participants
            .contains(&(event_id, user_id)))
    }

    async fn add_participant(&self, event_id: i64, user_id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.write().unwrap();
        if !inner.events.contains_key(&event_id) {
            return Err(AppError::not_found("event not found"));
        }
        Ok(inner.participants.insert((event_id, user_id)))
    }

    async fn remove_participant(&self, event_id: i64, user_id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.write().unwrap();
        if !inner.events.contains_key(&event_id) {
            return Err(AppError::not_found("event not found"));
        }
        Ok(inner.participants.remove(&(event_id, user_id)))
    }

    async fn upsert_categories(&self, names: &[String]) -> Result<Vec<Category>, AppError> {
        let mut inner = self.inner.write().unwrap();
        Ok(names.iter().map(|name| inner.upsert_category(name)).collect())
    }

    async fn upsert_location(&self, city: &str, street: &str) -> Result<Location, AppError> {
        Ok(self.inner.write().unwrap().upsert_location(city, street))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let mut categories: Vec<Category> =
            self.inner.read().unwrap().categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        Ok(self.inner.read().unwrap().categories.get(&id).cloned())
    }
}

#[async_trait]
impl ChatStore for MemStore {
    async fn insert_message(
        &self,
        event_id: i64,
        author_id: i64,
        content: &str,
    ) -> Result<ChatMessage, AppError> {
        let mut inner = self.inner.write().unwrap();
        let message = ChatMessage {
            id: inner.next_id(),
            event_id,
            author_id,
            content: content.to_string(),
            edited: false,
            created_at: Utc::now(),
        };
        inner.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn find_message(&self, id: i64) -> Result<Option<ChatMessage>, AppError> {
        Ok(self.inner.read().unwrap().messages.get(&id).cloned())
    }

    async fn update_message(&self, id: i64, content: &str) -> Result<ChatMessage, AppError> {
        let mut inner = self.inner.write().unwrap();
        let message = inner
            .messages
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("message not found"))?;
        message.content = content.to_string();
        message.edited = true;
        Ok(message.clone())
    }

    async fn delete_message(&self, id: i64) -> Result<(), AppError> {
        self.inner
            .write()
            .unwrap()
            .messages
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("message not found"))
    }

    async fn messages_for_event(
        &self,
        event_id: i64,
        limit: i64,
    ) -> Result<Vec<ChatMessageInfo>, AppError> {
        let inner = self.inner.read().unwrap();
        let mut messages: Vec<&ChatMessage> = inner
            .messages
            .values()
            .filter(|m| m.event_id == event_id)
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(messages
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|m| ChatMessageInfo {
                id: m.id,
                event_id: m.event_id,
                author_id: m.author_id,
                username: inner
                    .users
                    .get(&m.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
                content: m.content.clone(),
                edited: m.edited,
                created_at: m.created_at,
            })
            .collect())
    }
}

#[async_trait]
impl TaskStore for MemStore {
    async fn insert_task(&self, new: NewTask) -> Result<Task, AppError> {
        let mut inner = self.inner.write().unwrap();
        let task = Task {
            id: inner.next_id(),
            event_id: new.event_id,
            creator_id: new.creator_id,
            assigned_user_id: new.assigned_user_id,
            description: new.description,
            completed: false,
            created_at: Utc::now(),
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        Ok(self.inner.read().unwrap().tasks.get(&id).cloned())
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Task, AppError> {
        let mut inner = self.inner.write().unwrap();
        let task = inner
            .tasks
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("task not found"))?;
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(completed) = changes.completed {
            task.completed = completed;
        }
        match changes.assigned_user_id {
            Patch::Absent => {}
            Patch::Clear => task.assigned_user_id = None,
            Patch::Set(user_id) => task.assigned_user_id = Some(user_id),
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, id: i64) -> Result<(), AppError> {
        self.inner
            .write()
            .unwrap()
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("task not found"))
    }

    async fn tasks_for_event(&self, event_id: i64) -> Result<Vec<Task>, AppError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .tasks
            .values()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChecklistStore for MemStore {
    async fn insert_item(&self, new: NewChecklistItem) -> Result<ChecklistItem, AppError> {
        let mut inner = self.inner.write().unwrap();
        let item = ChecklistItem {
            id: inner.next_id(),
            event_id: new.event_id,
            created_by: new.created_by,
            assigned_user_id: new.assigned_user_id,
            name: new.name,
            description: new.description,
            quantity: new.quantity,
            completed: false,
            from_template: new.from_template,
            created_at: Utc::now(),
        };
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn insert_items(
        &self,
        items: Vec<NewChecklistItem>,
    ) -> Result<Vec<ChecklistItem>, AppError> {
        let mut inner = self.inner.write().unwrap();
        let mut inserted = Vec::with_capacity(items.len());
        for new in items {
            let item = ChecklistItem {
                id: inner.next_id(),
                event_id: new.event_id,
                created_by: new.created_by,
                assigned_user_id: new.assigned_user_id,
                name: new.name,
                description: new.description,
                quantity: new.quantity,
                completed: false,
                from_template: new.from_template,
                created_at: Utc::now(),
            };
            inner.items.insert(item.id, item.clone());
            inserted.push(item);
        }
        Ok(inserted)
    }

    async fn find_item(&self, id: i64) -> Result<Option<ChecklistItem>, AppError> {
        Ok(self.inner.read().unwrap().items.get(&id).cloned())
    }

    async fn update_item(
        &self,
        id: i64,
        changes: ChecklistItemChanges,
    ) -> Result<ChecklistItem, AppError> {
        let mut inner = self.inner.write().unwrap();
        let item = inner
            .items
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("checklist item not found"))?;
        if let Some(name) = changes.name {
            item.name = name;
        }
        match changes.description {
            Patch::Absent => {}
            Patch::Clear => item.description = None,
            Patch::Set(description) => item.description = Some(description),
        }
        if let Some(quantity) = changes.quantity {
            item.quantity = quantity;
        }
        if let Some(completed) = changes.completed {
            item.completed = completed;
        }
        match changes.assigned_user_id {
            Patch::Absent => {}
            Patch::Clear => item.assigned_user_id = None,
            Patch::Set(user_id) => item.assigned_user_id = Some(user_id),
        }
        Ok(item.clone())
    }

    async fn set_item_completed(
        &self,
        id: i64,
        completed: bool,
    ) -> Result<ChecklistItem, AppError> {
        let mut inner = self.inner.write().unwrap();
        let item = inner
            .items
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("checklist item not found"))?;
        item.completed = completed;
        Ok(item.clone())
    }

    async fn delete_item(&self, id: i64) -> Result<(), AppError> {
        self.inner
            .write()
            .unwrap()
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("checklist item not found"))
    }

    async fn items_for_event(&self, event_id: i64) -> Result<Vec<ChecklistItem>, AppError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .items
            .values()
            .filter(|i| i.event_id == event_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommentStore for MemStore {
    async fn insert_comment(
        &self,
        event_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<Comment, AppError> {
        let mut inner = self.inner.write().unwrap();
        let comment = Comment {
            id: inner.next_id(),
            event_id,
            user_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        inner.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn comment_triple_exists(
        &self,
        comment_id: i64,
        event_id: i64,
        user_id: i64,
    ) -> Result<bool, AppError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .comments
            .get(&comment_id)
            .is_some_and(|c| c.event_id == event_id && c.user_id == user_id))
    }

    async fn delete_comment(&self, id: i64) -> Result<(), AppError> {
        self.inner
            .write()
            .unwrap()
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("comment not found"))
    }

    async fn comments_for_event(&self, event_id: i64) -> Result<Vec<CommentInfo>, AppError> {
        let inner = self.inner.read().unwrap();
        let mut comments: Vec<&Comment> = inner
            .comments
            .values()
            .filter(|c| c.event_id == event_id)
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments
            .into_iter()
            .map(|c| CommentInfo {
                id: c.id,
                event_id: c.event_id,
                user_id: c.user_id,
                username: inner
                    .users
                    .get(&c.user_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
                text: c.text.clone(),
                created_at: c.created_at,
            })
            .collect())
    }
}

#[async_trait]
impl SubscriptionStore for MemStore {
    async fn subscribe(&self, user_id: i64, category_id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.write().unwrap();
        if !inner.categories.contains_key(&category_id) {
            return Err(AppError::not_found("category not found"));
        }
        Ok(inner.subscriptions.insert((user_id, category_id)))
    }

    async fn unsubscribe(&self, user_id: i64, category_id: i64) -> Result<bool, AppError> {
        Ok(self
            .inner
            .write()
            .unwrap()
            .subscriptions
            .remove(&(user_id, category_id)))
    }

    async fn is_subscribed(&self, user_id: i64, category_id: i64) -> Result<bool, AppError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .subscriptions
            .contains(&(user_id, category_id)))
    }

    async fn subscriptions_of(&self, user_id: i64) -> Result<Vec<Category>, AppError> {
        let inner = self.inner.read().unwrap();
        let mut categories: Vec<Category> = inner
            .subscriptions
            .iter()
            .filter(|(subscriber, _)| *subscriber == user_id)
            .filter_map(|(_, category_id)| inner.categories.get(category_id).cloned())
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn subscriber_emails(&self, category_ids: &[i64]) -> Result<Vec<String>, AppError> {
        let inner = self.inner.read().unwrap();
        let mut emails: Vec<String> = inner
            .subscriptions
            .iter()
            .filter(|(_, category_id)| category_ids.contains(category_id))
            .filter_map(|(user_id, _)| inner.users.get(user_id).map(|u| u.email.clone()))
            .collect();
        emails.sort();
        emails.dedup();
        Ok(emails)
    }
}

#[async_trait]
impl OrganizationStore for MemStore {
    async fn insert_organization(&self, new: NewOrganization) -> Result<Organization, AppError> {
        let mut inner = self.inner.write().unwrap();
        let organization = Organization {
            id: inner.next_id(),
            name: new.name,
            description: new.description,
            owner_id: new.owner_id,
            created_at: Utc::now(),
        };
        inner
            .organizations
            .insert(organization.id, organization.clone());
        Ok(organization)
    }

    async fn find_organization(&self, id: i64) -> Result<Option<Organization>, AppError> {
        Ok(self.inner.read().unwrap().organizations.get(&id).cloned())
    }

    async fn update_organization(
        &self,
        id: i64,
        changes: OrganizationChanges,
    ) -> Result<Organization, AppError> {
        let mut inner = self.inner.write().unwrap();
        let organization = inner
            .organizations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("organization not found"))?;
        if let Some(name) = changes.name {
            organization.name = name;
        }
        match changes.description {
            Patch::Absent => {}
            Patch::Clear => organization.description = None,
            Patch::Set(description) => organization.description = Some(description),
        }
        Ok(organization.clone())
    }

    async fn delete_organization(&self, id: i64) -> Result<(), AppError> {
        self.inner
            .write()
            .unwrap()
            .organizations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("organization not found"))
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, AppError> {
        let mut organizations: Vec<Organization> = self
            .inner
            .read()
            .unwrap()
            .organizations
            .values()
            .cloned()
            .collect();
        organizations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(organizations)
    }
}

#[async_trait]
impl ImageStore for MemStore {
    async fn insert_image(&self, new: NewImage) -> Result<Image, AppError> {
        let mut inner = self.inner.write().unwrap();
        let image = Image {
            id: inner.next_id(),
            filename: new.filename,
            original_filename: new.original_filename,
            content_type: new.content_type,
            size: new.size,
            file_path: new.file_path,
            user_id: new.user_id,
            event_id: new.event_id,
            message_id: new.message_id,
            created_at: Utc::now(),
        };
        inner.images.insert(image.id, image.clone());
        Ok(image)
    }

    async fn find_image(&self, id: i64) -> Result<Option<Image>, AppError> {
        Ok(self.inner.read().unwrap().images.get(&id).cloned())
    }

    async fn delete_image(&self, id: i64) -> Result<(), AppError> {
        self.inner
            .write()
            .unwrap()
            .images
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("image not found"))
    }
}

#[async_trait]
impl TemplateStore for MemStore {
    async fn insert_template(
        &self,
        new: NewTemplate,
    ) -> Result<(ChecklistTemplate, Vec<TemplateItem>), AppError> {
        let mut inner = self.inner.write().unwrap();
        let template = ChecklistTemplate {
            id: inner.next_id(),
            name: new.name,
            category: new.category,
            created_at: Utc::now(),
        };
        inner.templates.insert(template.id, template.clone());
        let mut items = Vec::with_capacity(new.items.len());
        for item in new.items {
            let row = TemplateItem {
                id: inner.next_id(),
                template_id: template.id,
                name: item.name,
                description: item.description,
                quantity: item.quantity,
            };
            inner.template_items.insert(row.id, row.clone());
            items.push(row);
        }
        Ok((template, items))
    }

    async fn find_template(
        &self,
        id: i64,
    ) -> Result<Option<(ChecklistTemplate, Vec<TemplateItem>)>, AppError> {
        let inner = self.inner.read().unwrap();
        let Some(template) = inner.templates.get(&id).cloned() else {
            return Ok(None);
        };
        let items = inner
            .template_items
            .values()
            .filter(|i| i.template_id == id)
            .cloned()
            .collect();
        Ok(Some((template, items)))
    }

    async fn update_template(
        &self,
        id: i64,
        changes: TemplateChanges,
    ) -> Result<(ChecklistTemplate, Vec<TemplateItem>), AppError> {
        let mut inner = self.inner.write().unwrap();
        if !inner.templates.contains_key(&id) {
            return Err(AppError::not_found("template not found"));
        }
        if let Some(name) = changes.name {
            inner.templates.get_mut(&id).unwrap().name = name;
        }
        if let Some(category) = changes.category {
            inner.templates.get_mut(&id).unwrap().category = category;
        }
        if let Some(new_items) = changes.items {
            inner.template_items.retain(|_, i| i.template_id != id);
            for item in new_items {
                let row = TemplateItem {
                    id: inner.next_id(),
                    template_id: id,
                    name: item.name,
                    description: item.description,
                    quantity: item.quantity,
                };
                inner.template_items.insert(row.id, row);
            }
        }
        let template = inner.templates[&id].clone();
        let items = inner
            .template_items
            .values()
            .filter(|i| i.template_id == id)
            .cloned()
            .collect();
        Ok((template, items))
    }

    async fn delete_template(&self, id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.write().unwrap();
        if inner.templates.remove(&id).is_none() {
            return Err(AppError::not_found("template not found"));
        }
        inner.template_items.retain(|_, i| i.template_id != id);
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<ChecklistTemplate>, AppError> {
        let mut templates: Vec<ChecklistTemplate> =
            self.inner.read().unwrap().templates.values().cloned().collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }
}

#[async_trait]
impl StatsStore for MemStore {
    async fn statistics(&self) -> Result<Statistics, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(Statistics {
            users: inner.users.len() as i64,
            events: inner.events.len() as i64,
            comments: inner.comments.len() as i64,
            chat_messages: inner.messages.len() as i64,
            tasks: inner.tasks.len() as i64,
            checklist_items: inner.items.len() as i64,
            organizations: inner.organizations.len() as i64,
        })
    }
}
