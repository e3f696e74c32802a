mod handler;
mod model;

pub use handler::{create_task, delete_task, list_tasks, update_task};
pub use model::{CreateTaskRequest, UpdateTaskRequest};
