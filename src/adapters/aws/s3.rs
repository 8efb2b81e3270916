use crate::domain::upload::UploadTarget;
use crate::ports::storage::StoragePort;
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use std::error::Error;
use std::time::Duration;

/// S3Adapter implements StoragePort for AWS S3.
#[derive(Clone)]
pub struct S3Adapter {
    client: Client,
    bucket: String,
}

impl S3Adapter {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl StoragePort for S3Adapter {
    async fn presign_upload(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<UploadTarget, Box<dyn Error + Send + Sync>> {
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(expires_in)?)
            .await?;

        Ok(UploadTarget {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            url: presigned.uri().to_string(),
        })
    }
}
