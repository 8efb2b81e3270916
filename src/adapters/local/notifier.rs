use crate::ports::notifier::NotifierPort;
use async_trait::async_trait;
use std::error::Error;
use tracing::info;

/// Local stand-in for the operator channel: outcomes land in the log.
#[derive(Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl NotifierPort for LogNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        info!(subject = %subject, body = %body, "notification");
        Ok(())
    }
}
