//! Submission handler: persist a training record, then hand it to the
//! workflow trigger.

use crate::domain::training::TrainingRecord;
use crate::domain::transcode::SourceLocation;
use crate::domain::workflow::WorkflowInput;
use crate::error::{Error, Result};
use crate::ports::repository::TrainingRepository;
use crate::ports::trigger::WorkflowTrigger;
use tracing::info;
use uuid::Uuid;

pub struct SubmissionService<R, W> {
    trainings: R,
    trigger: W,
}

impl<R, W> SubmissionService<R, W>
where
    R: TrainingRepository,
    W: WorkflowTrigger,
{
    pub fn new(trainings: R, trigger: W) -> Self {
        Self { trainings, trigger }
    }

    /// Create a training and start its orchestration. Returns the new id as
    /// soon as the record is persisted and the trigger accepted; transcoding
    /// continues in the background.
    ///
    /// Whether the staged object actually exists is not checked here; the
    /// transcode job fails explicitly later if it is missing.
    pub async fn submit(
        &self,
        title: &str,
        description: &str,
        source: SourceLocation,
    ) -> Result<String> {
        if title.trim().is_empty() {
            return Err(Error::Validation(String::from("title must not be empty")));
        }
        if description.trim().is_empty() {
            return Err(Error::Validation(String::from(
                "description must not be empty",
            )));
        }

        let training_id = Uuid::new_v4().to_string();
        let record = TrainingRecord::new(training_id.clone(), title, description, source.clone());

        // Record first. If this fails the caller gets the error and no
        // orchestration ever starts.
        self.trainings
            .put_training(&record)
            .await
            .map_err(Error::Persistence)?;

        let input = WorkflowInput {
            training_title: title.to_string(),
            training_id: training_id.clone(),
            bucket_name: source.bucket,
            s3_key: source.key,
        };
        self.trigger
            .start(input)
            .await
            .map_err(Error::Persistence)?;

        info!(training_id = %training_id, title = %title, "training submitted");
        Ok(training_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::training::TrainingStatus;
    use crate::ports::repository::MockTrainingRepository;
    use crate::ports::trigger::MockWorkflowTrigger;
    use mockall::Sequence;

    fn source() -> SourceLocation {
        SourceLocation::new("staging", "abc")
    }

    #[tokio::test]
    async fn persists_pending_record_before_triggering() {
        let mut trainings = MockTrainingRepository::new();
        let mut trigger = MockWorkflowTrigger::new();
        let mut seq = Sequence::new();

        trainings
            .expect_put_training()
            .withf(|record| {
                record.title == "Intro"
                    && record.status == TrainingStatus::Pending
                    && record.video_asset_key.is_none()
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        trigger
            .expect_start()
            .withf(|input| {
                input.training_title == "Intro"
                    && input.bucket_name == "staging"
                    && input.s3_key == "abc"
                    && !input.training_id.is_empty()
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let service = SubmissionService::new(trainings, trigger);
        let training_id = service.submit("Intro", "x", source()).await.unwrap();
        assert!(!training_id.is_empty());
    }

    #[tokio::test]
    async fn distinct_submissions_get_distinct_ids() {
        let mut trainings = MockTrainingRepository::new();
        let mut trigger = MockWorkflowTrigger::new();
        trainings.expect_put_training().returning(|_| Ok(()));
        trigger.expect_start().returning(|_| Ok(()));

        let service = SubmissionService::new(trainings, trigger);
        let first = service.submit("Intro", "x", source()).await.unwrap();
        let second = service.submit("Intro", "x", source()).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn blank_title_fails_fast() {
        let mut trainings = MockTrainingRepository::new();
        let mut trigger = MockWorkflowTrigger::new();
        trainings.expect_put_training().times(0);
        trigger.expect_start().times(0);

        let service = SubmissionService::new(trainings, trigger);
        let err = service.submit("  ", "x", source()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn blank_description_fails_fast() {
        let mut trainings = MockTrainingRepository::new();
        let mut trigger = MockWorkflowTrigger::new();
        trainings.expect_put_training().times(0);
        trigger.expect_start().times(0);

        let service = SubmissionService::new(trainings, trigger);
        let err = service.submit("Intro", "", source()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn persistence_failure_means_no_orchestration() {
        let mut trainings = MockTrainingRepository::new();
        let mut trigger = MockWorkflowTrigger::new();
        trainings
            .expect_put_training()
            .returning(|_| Err("table unavailable".into()));
        trigger.expect_start().times(0);

        let service = SubmissionService::new(trainings, trigger);
        let err = service.submit("Intro", "x", source()).await.unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }
}
