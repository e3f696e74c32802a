mod handler;
mod model;

pub use handler::{
    apply_template, create_item, delete_item, list_items, toggle_item, update_item,
};
pub use model::{CreateItemRequest, UpdateItemRequest};
