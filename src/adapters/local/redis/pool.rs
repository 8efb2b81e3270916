//! Redis connection pool.

use super::error::StoreError;
use deadpool_redis::{Config, Pool, Runtime};

/// Redis-backed store for trainings, user status, and reviews.
#[derive(Clone)]
pub struct RedisStore {
    pub(super) pool: Pool,
}

impl RedisStore {
    /// Create a new RedisStore with connection pool.
    pub fn new(redis_url: &str) -> Result<Self, StoreError> {
        let cfg = Config::from_url(redis_url);
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool })
    }
}
