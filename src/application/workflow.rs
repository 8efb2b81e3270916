//! The transcode orchestration workflow.
//!
//! An explicit finite-state run: ConvertingInput -> Transcoding ->
//! Persisting -> Succeeded, with Failed reachable from Transcoding and
//! Persisting. State is persisted through the training record's status
//! column; the in-memory `WorkflowState` only drives one run.
//!
//! Error policy: one attempt per step, no automatic retries. Callers
//! needing resilience re-submit the training.

use crate::config::WorkflowConfig;
use crate::domain::transcode::{
    destination_prefix, manifest_key, TranscodeJobSpec, TranscodeJobStatus, TranscodeProfile,
};
use crate::domain::workflow::{TranscodeRequest, WorkflowInput, WorkflowState};
use crate::error::Error;
use crate::ports::notifier::NotifierPort;
use crate::ports::repository::TrainingRepository;
use crate::ports::transcoder::TranscodePort;
use crate::ports::trigger::WorkflowTrigger;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

const NOTIFY_SUBJECT: &str = "[video training service] training creation notice";

pub struct TranscodeWorkflow<T, R, N> {
    transcoder: T,
    trainings: R,
    notifier: N,
    config: WorkflowConfig,
}

impl<T, R, N> TranscodeWorkflow<T, R, N>
where
    T: TranscodePort,
    R: TrainingRepository,
    N: NotifierPort,
{
    pub fn new(transcoder: T, trainings: R, notifier: N, config: WorkflowConfig) -> Self {
        Self {
            transcoder,
            trainings,
            notifier,
            config,
        }
    }

    /// Drive one orchestration to a terminal state. Never returns early on
    /// step failures: both terminal states converge on the notifier.
    pub async fn run(&self, input: WorkflowInput) -> WorkflowState {
        // ConvertingInput: normalize the trigger payload. Malformed input is
        // fatal and happens before any record is touched, so there is
        // nothing to mark failed and nobody to notify.
        let request = match TranscodeRequest::from_input(input) {
            Ok(request) => request,
            Err(e) => {
                error!(error = %e, "workflow input rejected");
                return WorkflowState::Failed;
            }
        };

        info!(
            training_id = %request.training_id,
            source_key = %request.source.key,
            "transcode workflow started"
        );

        match self.transcode_and_persist(&request).await {
            Ok(()) => {
                info!(training_id = %request.training_id, "transcode workflow succeeded");
                self.notify("succeeded", &request.training_title).await;
                WorkflowState::Succeeded
            }
            Err(e) => {
                error!(training_id = %request.training_id, error = %e, "transcode workflow failed");
                if let Err(mark) = self.trainings.fail_training(&request.training_id).await {
                    error!(
                        training_id = %request.training_id,
                        error = %mark,
                        "could not record workflow failure"
                    );
                }
                self.notify("failed", &request.training_title).await;
                WorkflowState::Failed
            }
        }
    }

    /// Transcoding and Persisting, in order. Any error drops the run into
    /// the failure branch of `run`.
    async fn transcode_and_persist(&self, request: &TranscodeRequest) -> Result<(), Error> {
        self.trainings
            .begin_converting(&request.training_id)
            .await
            .map_err(Error::Persistence)?;

        let spec = TranscodeJobSpec {
            source: request.source.clone(),
            destination_bucket: self.config.serving_bucket.clone(),
            destination_prefix: destination_prefix(&self.config.video_prefix, &request.training_id),
            profile: TranscodeProfile::default(),
        };

        let job_id = self
            .transcoder
            .submit_job(&spec)
            .await
            .map_err(|e| Error::UpstreamJob(e.to_string()))?;

        self.await_job(&job_id).await?;

        let video_asset_key = manifest_key(&self.config.video_prefix, &request.training_id);
        self.trainings
            .complete_training(&request.training_id, &video_asset_key)
            .await
            .map_err(Error::Persistence)?;

        Ok(())
    }

    /// Suspend on the job until it reports terminal status. Only this
    /// workflow instance is suspended; other trainings keep converting.
    async fn await_job(&self, job_id: &str) -> Result<(), Error> {
        let started = Instant::now();
        loop {
            match self
                .transcoder
                .poll_job(job_id)
                .await
                .map_err(|e| Error::UpstreamJob(e.to_string()))?
            {
                TranscodeJobStatus::Complete => return Ok(()),
                TranscodeJobStatus::Error(message) => return Err(Error::UpstreamJob(message)),
                TranscodeJobStatus::InProgress => {}
            }

            if let Some(limit) = self.config.transcode_timeout() {
                if started.elapsed() >= limit {
                    return Err(Error::Timeout(limit.as_secs()));
                }
            }

            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    /// Outcome dispatch is decoupled from record correctness: a delivery
    /// failure is logged and swallowed.
    async fn notify(&self, status: &str, training_title: &str) {
        let body = format!(
            "Automated notice from the video training service.\n\
             Creation of the following training has {}.\n\
             Training: {}",
            status, training_title
        );
        if let Err(e) = self.notifier.send(NOTIFY_SUBJECT, &body).await {
            warn!(error = %e, "outcome notification failed");
        }
    }
}

/// Production `WorkflowTrigger`: spawns the workflow on the runtime so each
/// training converts as an independent task and the submitter never waits.
pub struct SpawnTrigger<T, R, N> {
    workflow: Arc<TranscodeWorkflow<T, R, N>>,
}

impl<T, R, N> SpawnTrigger<T, R, N> {
    pub fn new(workflow: Arc<TranscodeWorkflow<T, R, N>>) -> Self {
        Self { workflow }
    }
}

impl<T, R, N> Clone for SpawnTrigger<T, R, N> {
    fn clone(&self) -> Self {
        Self {
            workflow: self.workflow.clone(),
        }
    }
}

#[async_trait]
impl<T, R, N> WorkflowTrigger for SpawnTrigger<T, R, N>
where
    T: TranscodePort + Send + Sync + 'static,
    R: TrainingRepository + Send + Sync + 'static,
    N: NotifierPort + Send + Sync + 'static,
{
    async fn start(
        &self,
        input: WorkflowInput,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let workflow = self.workflow.clone();
        tokio::spawn(async move {
            workflow.run(input).await;
        });
        Ok(())
    }
}
