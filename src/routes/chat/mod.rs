mod handler;
mod model;

pub use handler::{create_message, delete_message, list_messages, update_message};
pub use model::{CreateMessageRequest, UpdateMessageRequest};
