//! In-memory repositories.
//!
//! Backs the unit tests and small local experiments. Conditional-write
//! semantics come from the domain transitions, same as the Redis adapter.

use crate::domain::training::{Review, TrainingRecord, TrainingStatus, TrainingSummary, UserTrainingStatus};
use crate::ports::repository::{ReviewRepository, TrainingRepository, UserStatusRepository};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct MemoryStore {
    trainings: Arc<RwLock<HashMap<String, TrainingRecord>>>,
    user_status: Arc<RwLock<HashMap<(String, String), bool>>>,
    // training id -> (email -> review), so resubmission replaces
    reviews: Arc<RwLock<HashMap<String, BTreeMap<String, Review>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrainingRepository for MemoryStore {
    async fn put_training(
        &self,
        record: &TrainingRecord,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut trainings = self.trainings.write().await;
        if trainings.contains_key(&record.training_id) {
            return Err(format!("training {} already exists", record.training_id).into());
        }
        trainings.insert(record.training_id.clone(), record.clone());
        Ok(())
    }

    async fn get_training(
        &self,
        training_id: &str,
    ) -> Result<Option<TrainingRecord>, Box<dyn Error + Send + Sync>> {
        Ok(self.trainings.read().await.get(training_id).cloned())
    }

    async fn list_ready(&self) -> Result<Vec<TrainingSummary>, Box<dyn Error + Send + Sync>> {
        let trainings = self.trainings.read().await;
        let mut summaries: Vec<TrainingSummary> = trainings
            .values()
            .filter(|record| record.status == TrainingStatus::Ready)
            .map(TrainingSummary::from)
            .collect();
        summaries.sort_by(|a, b| a.training_id.cmp(&b.training_id));
        Ok(summaries)
    }

    async fn begin_converting(
        &self,
        training_id: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut trainings = self.trainings.write().await;
        let record = trainings
            .get_mut(training_id)
            .ok_or_else(|| format!("training {} not found", training_id))?;
        record.begin_converting()?;
        Ok(())
    }

    async fn complete_training(
        &self,
        training_id: &str,
        video_asset_key: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut trainings = self.trainings.write().await;
        let record = trainings
            .get_mut(training_id)
            .ok_or_else(|| format!("training {} not found", training_id))?;
        record.complete(video_asset_key)?;
        Ok(())
    }

    async fn fail_training(&self, training_id: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut trainings = self.trainings.write().await;
        let record = trainings
            .get_mut(training_id)
            .ok_or_else(|| format!("training {} not found", training_id))?;
        record.fail()?;
        Ok(())
    }
}

#[async_trait]
impl UserStatusRepository for MemoryStore {
    async fn get_status(
        &self,
        email: &str,
        training_id: &str,
    ) -> Result<Option<UserTrainingStatus>, Box<dyn Error + Send + Sync>> {
        let key = (email.to_string(), training_id.to_string());
        Ok(self
            .user_status
            .read()
            .await
            .get(&key)
            .map(|&completed| UserTrainingStatus {
                email: email.to_string(),
                training_id: training_id.to_string(),
                completed,
            }))
    }

    async fn mark_complete(
        &self,
        email: &str,
        training_id: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let key = (email.to_string(), training_id.to_string());
        self.user_status.write().await.insert(key, true);
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn put_review(&self, review: &Review) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.reviews
            .write()
            .await
            .entry(review.training_id.clone())
            .or_default()
            .insert(review.email.clone(), review.clone());
        Ok(())
    }

    async fn list_reviews(
        &self,
        training_id: &str,
    ) -> Result<Vec<Review>, Box<dyn Error + Send + Sync>> {
        Ok(self
            .reviews
            .read()
            .await
            .get(training_id)
            .map(|by_email| by_email.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transcode::SourceLocation;

    fn record(id: &str) -> TrainingRecord {
        TrainingRecord::new(id, "Intro", "x", SourceLocation::new("staging", "abc"))
    }

    #[tokio::test]
    async fn put_rejects_duplicate_ids() {
        let store = MemoryStore::new();
        store.put_training(&record("T1")).await.unwrap();
        assert!(store.put_training(&record("T1")).await.is_err());
    }

    #[tokio::test]
    async fn transitions_are_enforced() {
        let store = MemoryStore::new();
        store.put_training(&record("T1")).await.unwrap();

        // Completing a Pending record is rejected
        assert!(store
            .complete_training("T1", "video/T1/T1.m3u8")
            .await
            .is_err());

        store.begin_converting("T1").await.unwrap();
        store
            .complete_training("T1", "video/T1/T1.m3u8")
            .await
            .unwrap();

        // Terminal records stay put
        assert!(store.fail_training("T1").await.is_err());
        let stored = store.get_training("T1").await.unwrap().unwrap();
        assert_eq!(stored.status, TrainingStatus::Ready);
    }

    #[tokio::test]
    async fn list_ready_filters_and_sorts() {
        let store = MemoryStore::new();
        for id in ["T2", "T1", "T3"] {
            store.put_training(&record(id)).await.unwrap();
        }
        store.begin_converting("T2").await.unwrap();
        store
            .complete_training("T2", "video/T2/T2.m3u8")
            .await
            .unwrap();
        store.begin_converting("T1").await.unwrap();
        store
            .complete_training("T1", "video/T1/T1.m3u8")
            .await
            .unwrap();
        store.begin_converting("T3").await.unwrap();
        store.fail_training("T3").await.unwrap();

        let ids: Vec<String> = store
            .list_ready()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.training_id)
            .collect();
        assert_eq!(ids, vec!["T1", "T2"]);
    }

    #[tokio::test]
    async fn absent_status_rows_read_as_not_completed() {
        let store = MemoryStore::new();
        assert_eq!(
            store.get_status("ada@example.com", "T1").await.unwrap(),
            None
        );
        store.mark_complete("ada@example.com", "T1").await.unwrap();
        let status = store
            .get_status("ada@example.com", "T1")
            .await
            .unwrap()
            .unwrap();
        assert!(status.completed);
    }
}
