use crate::domain::upload::UploadTarget;
use async_trait::async_trait;
use std::error::Error;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Issue a write-scoped, expiring upload target for a staging key.
    /// How the credential is signed is the storage provider's business.
    async fn presign_upload(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<UploadTarget, Box<dyn Error + Send + Sync>>;
}
