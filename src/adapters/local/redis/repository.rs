//! Redis repository implementations.
//!
//! Status transitions go through the domain record, read-modify-write.
//! Submission is one-shot per training id and the monolith is the only
//! writer, so records see no cross-process contention.

use super::error::StoreError;
use super::pool::RedisStore;
use super::{REVIEWS_PREFIX, TRAINING_IDS_KEY, TRAINING_PREFIX, USER_STATUS_PREFIX};
use crate::domain::training::{
    Review, TrainingRecord, TrainingStatus, TrainingSummary, UserTrainingStatus,
};
use crate::ports::repository::{ReviewRepository, TrainingRepository, UserStatusRepository};
use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;

impl RedisStore {
    async fn load_training(&self, training_id: &str) -> Result<TrainingRecord, StoreError> {
        let mut conn = self.pool.get().await?;
        let key = format!("{}{}", TRAINING_PREFIX, training_id);
        let json: Option<String> = conn.get(&key).await?;
        match json {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Err(StoreError::NotFound(training_id.to_string())),
        }
    }

    async fn store_training(&self, record: &TrainingRecord) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        let key = format!("{}{}", TRAINING_PREFIX, record.training_id);
        let json = serde_json::to_string(record)?;
        conn.set::<_, _, ()>(&key, json).await?;
        Ok(())
    }
}

#[async_trait]
impl TrainingRepository for RedisStore {
    async fn put_training(
        &self,
        record: &TrainingRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(StoreError::from)?;
        let key = format!("{}{}", TRAINING_PREFIX, record.training_id);
        let json = serde_json::to_string(record).map_err(StoreError::from)?;

        // SET NX keeps submission one-shot per id
        let created: bool = deadpool_redis::redis::cmd("SET")
            .arg(&key)
            .arg(&json)
            .arg("NX")
            .query_async::<_, Option<String>>(&mut conn)
            .await
            .map_err(StoreError::from)?
            .is_some();
        if !created {
            return Err(format!("training {} already exists", record.training_id).into());
        }

        conn.sadd::<_, _, ()>(TRAINING_IDS_KEY, &record.training_id)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }

    async fn get_training(
        &self,
        training_id: &str,
    ) -> Result<Option<TrainingRecord>, Box<dyn std::error::Error + Send + Sync>> {
        match self.load_training(training_id).await {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_ready(
        &self,
    ) -> Result<Vec<TrainingSummary>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(StoreError::from)?;
        let mut ids: Vec<String> = conn
            .smembers(TRAINING_IDS_KEY)
            .await
            .map_err(StoreError::from)?;
        ids.sort();

        let mut summaries = Vec::new();
        for training_id in ids {
            if let Some(record) = self.get_training(&training_id).await? {
                if record.status == TrainingStatus::Ready {
                    summaries.push(TrainingSummary::from(&record));
                }
            }
        }
        Ok(summaries)
    }

    async fn begin_converting(
        &self,
        training_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut record = self.load_training(training_id).await?;
        record.begin_converting()?;
        self.store_training(&record).await?;
        Ok(())
    }

    async fn complete_training(
        &self,
        training_id: &str,
        video_asset_key: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut record = self.load_training(training_id).await?;
        record.complete(video_asset_key)?;
        self.store_training(&record).await?;
        Ok(())
    }

    async fn fail_training(
        &self,
        training_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut record = self.load_training(training_id).await?;
        record.fail()?;
        self.store_training(&record).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStatusRepository for RedisStore {
    async fn get_status(
        &self,
        email: &str,
        training_id: &str,
    ) -> Result<Option<UserTrainingStatus>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(StoreError::from)?;
        let key = format!("{}{}:{}", USER_STATUS_PREFIX, email, training_id);
        let json: Option<String> = conn.get(&key).await.map_err(StoreError::from)?;
        match json {
            Some(data) => Ok(Some(
                serde_json::from_str(&data).map_err(StoreError::from)?,
            )),
            None => Ok(None),
        }
    }

    async fn mark_complete(
        &self,
        email: &str,
        training_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(StoreError::from)?;
        let key = format!("{}{}:{}", USER_STATUS_PREFIX, email, training_id);
        let status = UserTrainingStatus {
            email: email.to_string(),
            training_id: training_id.to_string(),
            completed: true,
        };
        let json = serde_json::to_string(&status).map_err(StoreError::from)?;
        conn.set::<_, _, ()>(&key, json)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for RedisStore {
    async fn put_review(
        &self,
        review: &Review,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(StoreError::from)?;
        let key = format!("{}{}", REVIEWS_PREFIX, review.training_id);
        let json = serde_json::to_string(review).map_err(StoreError::from)?;
        // One hash field per reviewer, so resubmission replaces
        conn.hset::<_, _, _, ()>(&key, &review.email, json)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }

    async fn list_reviews(
        &self,
        training_id: &str,
    ) -> Result<Vec<Review>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(StoreError::from)?;
        let key = format!("{}{}", REVIEWS_PREFIX, training_id);
        let values: Vec<String> = conn.hvals(&key).await.map_err(StoreError::from)?;
        let mut reviews = Vec::with_capacity(values.len());
        for value in values {
            reviews.push(serde_json::from_str(&value).map_err(StoreError::from)?);
        }
        Ok(reviews)
    }
}
