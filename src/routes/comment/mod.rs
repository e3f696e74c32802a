mod handler;
mod model;

pub use handler::{create_comment, delete_comment};
pub use model::CreateCommentRequest;
