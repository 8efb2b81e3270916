use crate::domain::workflow::WorkflowInput;
use async_trait::async_trait;
use std::error::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowTrigger: Send + Sync {
    /// Start one transcode orchestration asynchronously. Returns once the
    /// orchestration is accepted, not when it finishes.
    async fn start(&self, input: WorkflowInput) -> Result<(), Box<dyn Error + Send + Sync>>;
}
