use std::sync::Arc;

use config::Config;
use redis::Client as RedisClient;
use sqlx::PgPool;

pub mod bus;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod notify;
pub mod push;
pub mod routes;
pub mod utils;

use bus::EventBus;
use push::PushDispatcher;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub redis: Arc<RedisClient>,
    pub bus: EventBus,
    pub push: PushDispatcher,
}
