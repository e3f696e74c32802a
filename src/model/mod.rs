mod filter;
mod patch;

pub use filter::EventFilter;
pub use patch::Patch;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

/// 角色，路由级粗粒度检查用；资源级检查走 access 模块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
    OrganizationOwner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::OrganizationOwner => "ORGANIZATION_OWNER",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            "ORGANIZATION_OWNER" => Some(Role::OrganizationOwner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

// roles 在库里是 TEXT[]，未知值直接丢弃
impl FromRow<'_, PgRow> for User {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let raw_roles: Vec<String> = row.try_get("roles")?;
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            roles: raw_roles.iter().filter_map(|r| Role::parse(r)).collect(),
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub creator_id: i64,
    pub location_id: i64,
    pub schedule_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: i64,
    pub city: String,
    pub street: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    pub id: i64,
    pub description: Option<String>,
}

/// 活动详情，聚合了位置、日程、分类与参与者
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetail {
    pub event: Event,
    pub location: Location,
    pub schedule: Option<Schedule>,
    pub categories: Vec<Category>,
    pub participant_ids: Vec<i64>,
}

/// 活动列表行，带位置信息
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventInfo {
    pub id: i64,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub creator_id: i64,
    pub city: String,
    pub street: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub event_id: i64,
    pub author_id: i64,
    pub content: String,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessageInfo {
    pub id: i64,
    pub event_id: i64,
    pub author_id: i64,
    pub username: String,
    pub content: String,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentInfo {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub event_id: i64,
    pub creator_id: i64,
    pub assigned_user_id: Option<i64>,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChecklistItem {
    pub id: i64,
    pub event_id: i64,
    pub created_by: i64,
    pub assigned_user_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub completed: bool,
    pub from_template: bool,
    pub created_at: DateTime<Utc>,
}

/// 清单模板分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateCategory {
    Party,
    Trip,
    Meeting,
    Other,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Party => "PARTY",
            TemplateCategory::Trip => "TRIP",
            TemplateCategory::Meeting => "MEETING",
            TemplateCategory::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<TemplateCategory> {
        match s {
            "PARTY" => Some(TemplateCategory::Party),
            "TRIP" => Some(TemplateCategory::Trip),
            "MEETING" => Some(TemplateCategory::Meeting),
            "OTHER" => Some(TemplateCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistTemplate {
    pub id: i64,
    pub name: String,
    pub category: TemplateCategory,
    pub created_at: DateTime<Utc>,
}

impl FromRow<'_, PgRow> for ChecklistTemplate {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let raw: String = row.try_get("category")?;
        Ok(ChecklistTemplate {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category: TemplateCategory::parse(&raw).unwrap_or(TemplateCategory::Other),
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateItem {
    pub id: i64,
    pub template_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
}

/// 图片元数据，三个外键最多只有一个非空
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Image {
    pub id: i64,
    pub filename: String,
    pub original_filename: String,
    pub content_type: String,
    pub size: i64,
    pub file_path: String,
    pub user_id: Option<i64>,
    pub event_id: Option<i64>,
    pub message_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub users: i64,
    pub events: i64,
    pub comments: i64,
    pub chat_messages: i64,
    pub tasks: i64,
    pub checklist_items: i64,
    pub organizations: i64,
}
