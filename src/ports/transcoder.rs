use crate::domain::transcode::{TranscodeJobSpec, TranscodeJobStatus};
use async_trait::async_trait;
use std::error::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscodePort: Send + Sync {
    /// Submit a transcode job. Returns the job id to poll.
    /// Fails the job (not this call) if the source object is missing.
    async fn submit_job(
        &self,
        spec: &TranscodeJobSpec,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;

    /// Report the job's current status.
    async fn poll_job(
        &self,
        job_id: &str,
    ) -> Result<TranscodeJobStatus, Box<dyn Error + Send + Sync>>;
}
