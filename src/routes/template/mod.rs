mod handler;
mod model;

pub use handler::{create_template, delete_template, update_template};
pub use model::{CreateTemplateRequest, TemplateDetail, UpdateTemplateRequest};
