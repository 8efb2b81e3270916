//! Configuration for different deployment environments.

use std::env;
use std::time::Duration;

/// Settings consumed by the transcode workflow, independent of deployment.
#[derive(Clone, Debug)]
pub struct WorkflowConfig {
    /// Bucket (or local directory) finished assets are served from
    pub serving_bucket: String,
    /// Key prefix under which HLS renditions are written
    pub video_prefix: String,
    /// Seconds between transcode job polls
    pub poll_interval_secs: u64,
    /// Overall limit on a single transcode job. The upstream design had no
    /// limit at all; `None` restores that behavior.
    pub transcode_timeout_secs: Option<u64>,
}

impl WorkflowConfig {
    pub fn new(serving_bucket: impl Into<String>) -> Self {
        Self {
            serving_bucket: serving_bucket.into(),
            video_prefix: String::from("video"),
            poll_interval_secs: 10,
            transcode_timeout_secs: Some(7200),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn transcode_timeout(&self) -> Option<Duration> {
        self.transcode_timeout_secs.map(Duration::from_secs)
    }
}

/// Configuration for local/monolith deployment.
#[cfg(feature = "local")]
#[derive(Clone, Debug)]
pub struct LocalConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Redis connection URL
    pub redis_url: String,
    /// Directory raw uploads are staged in
    pub staging_dir: String,
    /// Directory finished HLS assets are served from
    pub serving_dir: String,
    /// Base URL clients reach this server at, used in upload targets
    pub public_base_url: String,
    /// Lifetime of issued upload targets, in seconds
    pub presign_expiry_secs: u64,
    /// Workflow settings
    pub workflow: WorkflowConfig,
}

#[cfg(feature = "local")]
impl LocalConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let addr = env::var("ADDR").unwrap_or_else(|_| String::from("127.0.0.1"));
        let port = env::var("PORT").unwrap_or_else(|_| String::from("3000"));
        let serving_dir = env::var("SERVING_DIR").unwrap_or_else(|_| String::from("./serving"));
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", addr, port));

        let mut workflow = WorkflowConfig::new(serving_dir.clone());
        if let Ok(secs) = env::var("TRANSCODE_POLL_INTERVAL_SECS") {
            if let Ok(secs) = secs.parse() {
                workflow.poll_interval_secs = secs;
            }
        }
        if let Ok(secs) = env::var("TRANSCODE_TIMEOUT_SECS") {
            workflow.transcode_timeout_secs = secs.parse().ok();
        }

        Self {
            addr,
            port,
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| String::from("redis://127.0.0.1/")),
            staging_dir: env::var("STAGING_DIR").unwrap_or_else(|_| String::from("./staging")),
            serving_dir,
            public_base_url,
            presign_expiry_secs: env::var("PRESIGN_EXPIRY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            workflow,
        }
    }
}

/// Configuration for AWS deployment.
#[cfg(feature = "aws")]
#[derive(Clone, Debug)]
pub struct AwsConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Domain the web contents are served from; also the serving bucket name
    pub app_domain: String,
    /// S3 bucket raw uploads are staged in
    pub upload_bucket: String,
    /// DynamoDB table holding training records
    pub trainings_table: String,
    /// DynamoDB table holding per-user completion state
    pub user_status_table: String,
    /// DynamoDB table holding reviews
    pub reviews_table: String,
    /// SNS topic the workflow outcome is published to
    pub notification_topic_arn: String,
    /// IAM role passed to MediaConvert jobs
    pub mediaconvert_role_arn: String,
    /// Optional MediaConvert queue ARN
    pub mediaconvert_queue_arn: Option<String>,
    /// Optional account-specific MediaConvert endpoint
    pub mediaconvert_endpoint: Option<String>,
    /// Lifetime of presigned upload URLs, in seconds
    pub presign_expiry_secs: u64,
    /// Workflow settings
    pub workflow: WorkflowConfig,
}

#[cfg(feature = "aws")]
impl AwsConfig {
    /// Load configuration from environment variables.
    /// Panics if required variables are not set.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let app_domain = env::var("APP_DOMAIN").expect("APP_DOMAIN env var required");
        let upload_bucket =
            env::var("UPLOAD_BUCKET").unwrap_or_else(|_| format!("upload.{}", app_domain));

        let mut workflow = WorkflowConfig::new(app_domain.clone());
        if let Ok(secs) = env::var("TRANSCODE_POLL_INTERVAL_SECS") {
            if let Ok(secs) = secs.parse() {
                workflow.poll_interval_secs = secs;
            }
        }
        if let Ok(secs) = env::var("TRANSCODE_TIMEOUT_SECS") {
            workflow.transcode_timeout_secs = secs.parse().ok();
        }

        Self {
            addr: env::var("ADDR").unwrap_or_else(|_| String::from("0.0.0.0")),
            port: env::var("PORT").unwrap_or_else(|_| String::from("8080")),
            app_domain,
            upload_bucket,
            trainings_table: env::var("TRAININGS_TABLE_NAME")
                .expect("TRAININGS_TABLE_NAME env var required"),
            user_status_table: env::var("USER_TRAINING_STATUS_TABLE_NAME")
                .expect("USER_TRAINING_STATUS_TABLE_NAME env var required"),
            reviews_table: env::var("REVIEWS_TABLE_NAME")
                .expect("REVIEWS_TABLE_NAME env var required"),
            notification_topic_arn: env::var("NOTIFICATION_TOPIC_ARN")
                .expect("NOTIFICATION_TOPIC_ARN env var required"),
            mediaconvert_role_arn: env::var("MEDIACONVERT_ROLE_ARN")
                .expect("MEDIACONVERT_ROLE_ARN env var required"),
            mediaconvert_queue_arn: env::var("MEDIACONVERT_QUEUE_ARN").ok(),
            mediaconvert_endpoint: env::var("MEDIACONVERT_ENDPOINT").ok(),
            presign_expiry_secs: env::var("PRESIGN_EXPIRY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            workflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_config_defaults() {
        let config = WorkflowConfig::new("trainings.example.com");
        assert_eq!(config.video_prefix, "video");
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.transcode_timeout(), Some(Duration::from_secs(7200)));
    }
}
