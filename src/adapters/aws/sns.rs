use crate::ports::notifier::NotifierPort;
use async_trait::async_trait;
use aws_sdk_sns::Client;
use std::error::Error;

/// SnsAdapter implements NotifierPort for AWS SNS.
#[derive(Clone)]
pub struct SnsAdapter {
    client: Client,
    topic_arn: String,
}

impl SnsAdapter {
    pub fn new(client: Client, topic_arn: String) -> Self {
        Self { client, topic_arn }
    }
}

#[async_trait]
impl NotifierPort for SnsAdapter {
    async fn send(&self, subject: &str, body: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(body)
            .send()
            .await?;
        Ok(())
    }
}
