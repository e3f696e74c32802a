mod handler;
mod model;

pub use handler::{delete_image, register_image};
pub use model::RegisterImageRequest;
