mod handler;
mod model;

pub use handler::{create_organization, delete_organization, update_organization};
pub use model::{CreateOrganizationRequest, UpdateOrganizationRequest};
