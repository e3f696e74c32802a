mod handler;
mod model;

pub use handler::{
    create_event, delete_event, join_event, joined_events, leave_event, my_events,
    remove_participant, update_event,
};
pub use model::{ChangedResponse, CreateEventRequest, UpdateEventRequest};
