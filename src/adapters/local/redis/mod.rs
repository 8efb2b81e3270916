//! Redis adapter for local deployment.
//!
//! Redis-backed implementations of the three repositories:
//! - `TrainingRepository` for training records
//! - `UserStatusRepository` for per-user completion state
//! - `ReviewRepository` for reviews

mod error;
mod pool;
mod repository;

pub use error::StoreError;
pub use pool::RedisStore;

/// Redis key constants
const TRAINING_PREFIX: &str = "otis:training:";
const TRAINING_IDS_KEY: &str = "otis:training_ids";
const USER_STATUS_PREFIX: &str = "otis:user_status:";
const REVIEWS_PREFIX: &str = "otis:reviews:";
