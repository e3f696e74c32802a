//! 存储能力接口。每个聚合一个 trait，`Store` 聚合成对象安全的总接口，
//! 生产实现为 Postgres（`pg`），测试实现为内存存储（`mem`）。
//! 多步写操作由实现方保证原子性：Postgres 走事务，内存实现走单把写锁。

#[cfg(test)]
pub mod mem;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::model::{
    Category, ChatMessage, ChatMessageInfo, ChecklistItem, ChecklistTemplate, Comment, CommentInfo,
    Event, EventDetail, EventFilter, EventInfo, Image, Location, Organization, Patch, Role,
    Statistics, Task, TemplateCategory, TemplateItem, User,
};

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

#[derive(Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

pub struct NewEvent {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub schedule_description: Option<String>,
    pub city: String,
    pub street: String,
    pub category_names: Vec<String>,
    pub creator_id: i64,
}

/// 活动合并更新。None/Absent 的字段不动；分类给出时整体替换
#[derive(Default)]
pub struct EventChanges {
    pub name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub schedule_description: Patch<String>,
    pub category_names: Option<Vec<String>>,
}

pub struct NewTask {
    pub event_id: i64,
    pub creator_id: i64,
    pub assigned_user_id: Option<i64>,
    pub description: String,
}

#[derive(Default)]
pub struct TaskChanges {
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub assigned_user_id: Patch<i64>,
}

pub struct NewChecklistItem {
    pub event_id: i64,
    pub created_by: i64,
    pub assigned_user_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub from_template: bool,
}

#[derive(Default)]
pub struct ChecklistItemChanges {
    pub name: Option<String>,
    pub description: Patch<String>,
    pub quantity: Option<i32>,
    pub completed: Option<bool>,
    pub assigned_user_id: Patch<i64>,
}

pub struct NewImage {
    pub filename: String,
    pub original_filename: String,
    pub content_type: String,
    pub size: i64,
    pub file_path: String,
    pub user_id: Option<i64>,
    pub event_id: Option<i64>,
    pub message_id: Option<i64>,
}

pub struct NewOrganization {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
}

#[derive(Default)]
pub struct OrganizationChanges {
    pub name: Option<String>,
    pub description: Patch<String>,
}

pub struct NewTemplateItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
}

pub struct NewTemplate {
    pub name: String,
    pub category: TemplateCategory,
    pub items: Vec<NewTemplateItem>,
}

/// items 给出时整体替换模板条目
#[derive(Default)]
pub struct TemplateChanges {
    pub name: Option<String>,
    pub category: Option<TemplateCategory>,
    pub items: Option<Vec<NewTemplateItem>>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// 用户名或邮箱重复时返回 Conflict
    async fn insert_user(&self, new: NewUser) -> Result<User, AppError>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<User, AppError>;
    async fn set_roles(&self, id: i64, roles: &[Role]) -> Result<User, AppError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// 整个创建序列在一个原子单元内完成：分类 upsert、日程插入、
    /// 位置 resolve-or-create、创建者校验、活动落库、分类关联
    async fn create_event(&self, new: NewEvent) -> Result<EventDetail, AppError>;
    async fn find_event(&self, id: i64) -> Result<Option<Event>, AppError>;
    async fn event_detail(&self, id: i64) -> Result<Option<EventDetail>, AppError>;
    async fn update_event(&self, id: i64, changes: EventChanges) -> Result<EventDetail, AppError>;
    /// 级联删除评论、聊天、任务、清单项、图片
    async fn delete_event(&self, id: i64) -> Result<(), AppError>;
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventInfo>, AppError>;
    async fn events_created_by(&self, user_id: i64) -> Result<Vec<Event>, AppError>;
    /// 用户参加的活动是查询出来的，不维护反向集合
    async fn events_joined_by(&self, user_id: i64) -> Result<Vec<Event>, AppError>;
    async fn is_event_creator(&self, event_id: i64, user_id: i64) -> Result<bool, AppError>;
    async fn is_participant(&self, event_id: i64, user_id: i64) -> Result<bool, AppError>;
    /// 返回是否真的发生了变化，已在组内时不写库
    async fn add_participant(&self, event_id: i64, user_id: i64) -> Result<bool, AppError>;
    async fn remove_participant(&self, event_id: i64, user_id: i64) -> Result<bool, AppError>;
    /// 按名字 resolve-or-create，同名并发以唯一约束裁决，不产生重复行
    async fn upsert_categories(&self, names: &[String]) -> Result<Vec<Category>, AppError>;
    /// 按 (city, street) resolve-or-create
    async fn upsert_location(&self, city: &str, street: &str) -> Result<Location, AppError>;
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn insert_message(
        &self,
        event_id: i64,
        author_id: i64,
        content: &str,
    ) -> Result<ChatMessage, AppError>;
    async fn find_message(&self, id: i64) -> Result<Option<ChatMessage>, AppError>;
    /// 同时置 edited 标记
    async fn update_message(&self, id: i64, content: &str) -> Result<ChatMessage, AppError>;
    async fn delete_message(&self, id: i64) -> Result<(), AppError>;
    async fn messages_for_event(
        &self,
        event_id: i64,
        limit: i64,
    ) -> Result<Vec<ChatMessageInfo>, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, new: NewTask) -> Result<Task, AppError>;
    async fn find_task(&self, id: i64) -> Result<Option<Task>, AppError>;
    async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Task, AppError>;
    async fn delete_task(&self, id: i64) -> Result<(), AppError>;
    async fn tasks_for_event(&self, event_id: i64) -> Result<Vec<Task>, AppError>;
}

#[async_trait]
pub trait ChecklistStore: Send + Sync {
    async fn insert_item(&self, new: NewChecklistItem) -> Result<ChecklistItem, AppError>;
    /// 模板应用用：整批插入，要么全部成功要么全部失败
    async fn insert_items(
        &self,
        items: Vec<NewChecklistItem>,
    ) -> Result<Vec<ChecklistItem>, AppError>;
    async fn find_item(&self, id: i64) -> Result<Option<ChecklistItem>, AppError>;
    async fn update_item(
        &self,
        id: i64,
        changes: ChecklistItemChanges,
    ) -> Result<ChecklistItem, AppError>;
    async fn set_item_completed(
        &self,
        id: i64,
        completed: bool,
    ) -> Result<ChecklistItem, AppError>;
    async fn delete_item(&self, id: i64) -> Result<(), AppError>;
    async fn items_for_event(&self, event_id: i64) -> Result<Vec<ChecklistItem>, AppError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(
        &self,
        event_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<Comment, AppError>;
    /// 删除权限的三元组存在性判定
    async fn comment_triple_exists(
        &self,
        comment_id: i64,
        event_id: i64,
        user_id: i64,
    ) -> Result<bool, AppError>;
    async fn delete_comment(&self, id: i64) -> Result<(), AppError>;
    async fn comments_for_event(&self, event_id: i64) -> Result<Vec<CommentInfo>, AppError>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn subscribe(&self, user_id: i64, category_id: i64) -> Result<bool, AppError>;
    async fn unsubscribe(&self, user_id: i64, category_id: i64) -> Result<bool, AppError>;
    async fn is_subscribed(&self, user_id: i64, category_id: i64) -> Result<bool, AppError>;
    async fn subscriptions_of(&self, user_id: i64) -> Result<Vec<Category>, AppError>;
    /// 订阅了任一分类的用户邮箱，去重
    async fn subscriber_emails(&self, category_ids: &[i64]) -> Result<Vec<String>, AppError>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn insert_organization(&self, new: NewOrganization) -> Result<Organization, AppError>;
    async fn find_organization(&self, id: i64) -> Result<Option<Organization>, AppError>;
    async fn update_organization(
        &self,
        id: i64,
        changes: OrganizationChanges,
    ) -> Result<Organization, AppError>;
    async fn delete_organization(&self, id: i64) -> Result<(), AppError>;
    async fn list_organizations(&self) -> Result<Vec<Organization>, AppError>;
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn insert_image(&self, new: NewImage) -> Result<Image, AppError>;
    async fn find_image(&self, id: i64) -> Result<Option<Image>, AppError>;
    async fn delete_image(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn insert_template(
        &self,
        new: NewTemplate,
    ) -> Result<(ChecklistTemplate, Vec<TemplateItem>), AppError>;
    async fn find_template(
        &self,
        id: i64,
    ) -> Result<Option<(ChecklistTemplate, Vec<TemplateItem>)>, AppError>;
    async fn update_template(
        &self,
        id: i64,
        changes: TemplateChanges,
    ) -> Result<(ChecklistTemplate, Vec<TemplateItem>), AppError>;
    async fn delete_template(&self, id: i64) -> Result<(), AppError>;
    async fn list_templates(&self) -> Result<Vec<ChecklistTemplate>, AppError>;
}

#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn statistics(&self) -> Result<Statistics, AppError>;
}

pub trait Store:
    UserStore
    + EventStore
    + ChatStore
    + TaskStore
    + ChecklistStore
    + CommentStore
    + SubscriptionStore
    + OrganizationStore
    + ImageStore
    + TemplateStore
    + StatsStore
{
}

impl<T> Store for T where
    T: UserStore
        + EventStore
        + ChatStore
        + TaskStore
        + ChecklistStore
        + CommentStore
        + SubscriptionStore
        + OrganizationStore
        + ImageStore
        + TemplateStore
        + StatsStore
{
}
