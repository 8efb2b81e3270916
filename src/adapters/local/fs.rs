use crate::domain::upload::UploadTarget;
use crate::ports::storage::StoragePort;
use async_trait::async_trait;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

/// Filesystem staging area. "Presigning" locally means pointing the client
/// at the monolith's own staging upload route; the expiry is advisory.
#[derive(Clone)]
pub struct LocalStorage {
    staging_dir: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(staging_dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl StoragePort for LocalStorage {
    async fn presign_upload(
        &self,
        key: &str,
        _expires_in: Duration,
    ) -> Result<UploadTarget, Box<dyn Error + Send + Sync>> {
        tokio::fs::create_dir_all(&self.staging_dir).await?;
        Ok(UploadTarget {
            bucket: self.staging_dir.to_string_lossy().to_string(),
            key: key.to_string(),
            url: format!(
                "{}/upload/{}",
                self.public_base_url.trim_end_matches('/'),
                key
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn target_points_at_the_staging_route() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://127.0.0.1:3000/");

        let target = storage
            .presign_upload("abc", Duration::from_secs(3600))
            .await
            .unwrap();

        assert_eq!(target.key, "abc");
        assert_eq!(target.url, "http://127.0.0.1:3000/upload/abc");
        assert!(dir.path().exists());
    }
}
