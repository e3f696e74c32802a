mod handler;
mod model;

pub use handler::{
    event_detail, get_organization, get_template, get_user, list_categories, list_comments,
    list_events, list_organizations, list_templates,
};
pub use model::{PublicUserInfo, invalidate_event_cache};
