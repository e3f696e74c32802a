use std::sync::Arc;

use redis::Client as RedisClient;

pub mod access;
pub mod config;
pub mod error;
pub mod middleware;
pub mod model;
pub mod notify;
pub mod routes;
pub mod store;
pub mod utils;

#[cfg(test)]
pub mod testing;

use access::AccessControl;
use config::Config;
use notify::Notifier;
use store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
    pub redis: Arc<RedisClient>,
    pub notifier: Notifier,
    pub access: Arc<AccessControl>,
}
