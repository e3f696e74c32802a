mod handler;
mod model;

pub use handler::{set_user_roles, statistics};
pub use model::SetRolesRequest;
