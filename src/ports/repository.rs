use crate::domain::training::{Review, TrainingRecord, TrainingSummary, UserTrainingStatus};
use async_trait::async_trait;
use std::error::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrainingRepository: Send + Sync {
    /// Create a training record. Fails if the id already exists.
    async fn put_training(
        &self,
        record: &TrainingRecord,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn get_training(
        &self,
        training_id: &str,
    ) -> Result<Option<TrainingRecord>, Box<dyn Error + Send + Sync>>;

    /// Summaries of Ready trainings only.
    async fn list_ready(&self) -> Result<Vec<TrainingSummary>, Box<dyn Error + Send + Sync>>;

    /// Mark the record Converting. Fails unless it is Pending.
    async fn begin_converting(
        &self,
        training_id: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Write the finished asset key and the Ready status together.
    /// Sole writer of the asset key; fails if one was already set.
    async fn complete_training(
        &self,
        training_id: &str,
        video_asset_key: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Mark the record Failed. Fails on terminal records.
    async fn fail_training(&self, training_id: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStatusRepository: Send + Sync {
    /// Completion state for one (user, training) pair. Absent rows read as
    /// not completed.
    async fn get_status(
        &self,
        email: &str,
        training_id: &str,
    ) -> Result<Option<UserTrainingStatus>, Box<dyn Error + Send + Sync>>;

    /// Idempotently set `completed = true`, creating the row if needed.
    /// Never reverts an existing completion.
    async fn mark_complete(
        &self,
        email: &str,
        training_id: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Store a review, replacing the caller's previous one if any.
    async fn put_review(&self, review: &Review) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn list_reviews(
        &self,
        training_id: &str,
    ) -> Result<Vec<Review>, Box<dyn Error + Send + Sync>>;
}
