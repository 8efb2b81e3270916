//! Upload intake: hand clients a place to put the raw video.

use crate::domain::upload::UploadTarget;
use crate::error::{Error, Result};
use crate::ports::storage::StoragePort;
use std::time::Duration;
use uuid::Uuid;

pub struct UploadIntakeService<S> {
    storage: S,
    expires_in: Duration,
}

impl<S> UploadIntakeService<S>
where
    S: StoragePort,
{
    pub fn new(storage: S, expires_in: Duration) -> Self {
        Self {
            storage,
            expires_in,
        }
    }

    /// Issue a staging destination plus an expiring write credential.
    /// Each call mints a fresh key; no other side effects.
    pub async fn request_upload_target(&self) -> Result<UploadTarget> {
        let key = Uuid::new_v4().to_string();
        self.storage
            .presign_upload(&key, self.expires_in)
            .await
            .map_err(Error::Persistence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::storage::MockStoragePort;

    #[tokio::test]
    async fn repeated_calls_yield_independent_targets() {
        let mut storage = MockStoragePort::new();
        storage
            .expect_presign_upload()
            .withf(|key, expires_in| !key.is_empty() && *expires_in == Duration::from_secs(3600))
            .times(2)
            .returning(|key, _| {
                Ok(UploadTarget {
                    bucket: String::from("upload.trainings.example.com"),
                    key: key.to_string(),
                    url: format!("https://upload.trainings.example.com/{}", key),
                })
            });

        let service = UploadIntakeService::new(storage, Duration::from_secs(3600));
        let first = service.request_upload_target().await.unwrap();
        let second = service.request_upload_target().await.unwrap();
        assert_ne!(first.key, second.key);
        assert_ne!(first.url, second.url);
    }
}
