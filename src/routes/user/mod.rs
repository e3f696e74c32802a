mod handler;
mod model;

pub use handler::{login, me, register, update_profile};
pub use model::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest};
