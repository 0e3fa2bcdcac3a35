pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use crate::app::identity::SessionResolver;
use crate::infra::{cache::RedisCache, db::Db};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub cache: RedisCache,
    pub sessions: SessionResolver,
}

impl AppState {
    pub fn new(db: Db, cache: RedisCache, sessions: SessionResolver) -> Self {
        Self {
            db,
            cache,
            sessions,
        }
    }
}
