//! Viewer-facing operations: catalog, playback completion, reviews.

use crate::domain::training::{Review, TrainingRecord, TrainingSummary};
use crate::error::{Error, Result};
use crate::ports::repository::{ReviewRepository, TrainingRepository, UserStatusRepository};
use tracing::info;

/// A training record together with the requesting user's completion flag.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingDetail {
    pub record: TrainingRecord,
    pub is_completed: bool,
}

pub struct ViewerService<R> {
    store: R,
}

impl<R> ViewerService<R>
where
    R: TrainingRepository + UserStatusRepository + ReviewRepository,
{
    pub fn new(store: R) -> Self {
        Self { store }
    }

    /// Trainings with a finished rendition, ready to watch.
    pub async fn list_trainings(&self) -> Result<Vec<TrainingSummary>> {
        self.store.list_ready().await.map_err(Error::Persistence)
    }

    pub async fn get_training(&self, training_id: &str, email: &str) -> Result<TrainingDetail> {
        let record = self
            .store
            .get_training(training_id)
            .await
            .map_err(Error::Persistence)?
            .ok_or_else(|| Error::NotFound(format!("training {}", training_id)))?;

        // Absent row means the user never finished this training.
        let is_completed = self
            .store
            .get_status(email, training_id)
            .await
            .map_err(Error::Persistence)?
            .map(|status| status.completed)
            .unwrap_or(false);

        Ok(TrainingDetail {
            record,
            is_completed,
        })
    }

    /// Called by clients once playback crosses the completion threshold.
    /// Idempotent; completion never reverts.
    pub async fn mark_complete(&self, email: &str, training_id: &str) -> Result<()> {
        self.store
            .mark_complete(email, training_id)
            .await
            .map_err(Error::Persistence)?;
        info!(email = %email, training_id = %training_id, "training marked complete");
        Ok(())
    }

    pub async fn create_review(
        &self,
        email: &str,
        training_id: &str,
        rating: u8,
        comment: &str,
    ) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(Error::Validation(format!(
                "rating must be between 1 and 5, got {}",
                rating
            )));
        }
        if comment.trim().is_empty() {
            return Err(Error::Validation(String::from("comment must not be empty")));
        }

        let review = Review {
            training_id: training_id.to_string(),
            email: email.to_string(),
            rating,
            comment: comment.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.store
            .put_review(&review)
            .await
            .map_err(Error::Persistence)
    }

    pub async fn list_reviews(&self, training_id: &str) -> Result<Vec<Review>> {
        self.store
            .list_reviews(training_id)
            .await
            .map_err(Error::Persistence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::training::TrainingStatus;
    use crate::domain::transcode::SourceLocation;

    async fn store_with_ready_training() -> MemoryStore {
        let store = MemoryStore::new();
        let record = TrainingRecord::new("T1", "Intro", "x", SourceLocation::new("staging", "abc"));
        store.put_training(&record).await.unwrap();
        store.begin_converting("T1").await.unwrap();
        store
            .complete_training("T1", "video/T1/T1.m3u8")
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn list_shows_only_ready_trainings() {
        let store = store_with_ready_training().await;
        store
            .put_training(&TrainingRecord::new(
                "T2",
                "Draft",
                "y",
                SourceLocation::new("staging", "def"),
            ))
            .await
            .unwrap();

        let service = ViewerService::new(store);
        let summaries = service.list_trainings().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].training_id, "T1");
        assert_eq!(summaries[0].title, "Intro");
    }

    #[tokio::test]
    async fn detail_merges_completion_state() {
        let service = ViewerService::new(store_with_ready_training().await);

        let before = service.get_training("T1", "ada@example.com").await.unwrap();
        assert!(!before.is_completed);
        assert_eq!(before.record.status, TrainingStatus::Ready);

        service
            .mark_complete("ada@example.com", "T1")
            .await
            .unwrap();

        let after = service.get_training("T1", "ada@example.com").await.unwrap();
        assert!(after.is_completed);

        // Another user is unaffected
        let other = service.get_training("T1", "bob@example.com").await.unwrap();
        assert!(!other.is_completed);
    }

    #[tokio::test]
    async fn unknown_training_is_not_found() {
        let service = ViewerService::new(MemoryStore::new());
        let err = service
            .get_training("nope", "ada@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn mark_complete_twice_equals_once() {
        let service = ViewerService::new(store_with_ready_training().await);

        service
            .mark_complete("ada@example.com", "T1")
            .await
            .unwrap();
        let once = service.get_training("T1", "ada@example.com").await.unwrap();

        service
            .mark_complete("ada@example.com", "T1")
            .await
            .unwrap();
        let twice = service.get_training("T1", "ada@example.com").await.unwrap();

        assert_eq!(once, twice);
        assert!(twice.is_completed);
    }

    #[tokio::test]
    async fn review_rating_is_validated() {
        let service = ViewerService::new(store_with_ready_training().await);
        for rating in [0u8, 6] {
            let err = service
                .create_review("ada@example.com", "T1", rating, "solid")
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
        let err = service
            .create_review("ada@example.com", "T1", 4, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn resubmitting_a_review_replaces_it() {
        let service = ViewerService::new(store_with_ready_training().await);

        service
            .create_review("ada@example.com", "T1", 3, "fine")
            .await
            .unwrap();
        service
            .create_review("ada@example.com", "T1", 5, "rewatched, great")
            .await
            .unwrap();
        service
            .create_review("bob@example.com", "T1", 2, "too fast")
            .await
            .unwrap();

        let reviews = service.list_reviews("T1").await.unwrap();
        assert_eq!(reviews.len(), 2);
        let ada = reviews
            .iter()
            .find(|r| r.email == "ada@example.com")
            .unwrap();
        assert_eq!(ada.rating, 5);
        assert_eq!(ada.comment, "rewatched, great");
    }
}
