//! Error taxonomy for the training platform core.

use thiserror::Error;

/// Boxed error type returned by the ports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad caller input. Fails fast, no side effects.
    #[error("validation error: {0}")]
    Validation(String),

    /// The workflow trigger payload could not be normalized. Fatal, not retried.
    #[error(transparent)]
    MalformedInput(#[from] crate::domain::workflow::MalformedInput),

    /// The external transcode job reported failure. Terminal for the workflow.
    #[error("transcode job failed: {0}")]
    UpstreamJob(String),

    /// The transcode job did not reach a terminal status within the configured limit.
    #[error("transcode job timed out after {0} seconds")]
    Timeout(u64),

    /// A storage or persistence collaborator failed. Terminal for the step.
    #[error("persistence error: {0}")]
    Persistence(#[source] BoxError),

    /// The notification channel failed. Logged by callers, never escalated.
    #[error("notification error: {0}")]
    Notification(#[source] BoxError),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
