use async_trait::async_trait;
use std::error::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotifierPort: Send + Sync {
    /// Fire-and-forget dispatch to the operator channel. Callers log
    /// failures and move on; delivery is best-effort.
    async fn send(&self, subject: &str, body: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}
