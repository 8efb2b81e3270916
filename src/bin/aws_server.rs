//! AWS Server Binary
//!
//! Serves the training API against managed services: S3 for staging,
//! DynamoDB for state, Elemental MediaConvert for transcoding, SNS for
//! outcome notifications. Sits behind a load balancer that authenticates
//! users and forwards their claims in `x-amzn-oidc-data`.
//!
//! Environment Variables:
//! - APP_DOMAIN: serving bucket / web domain
//! - UPLOAD_BUCKET: staging bucket (default `upload.{APP_DOMAIN}`)
//! - TRAININGS_TABLE_NAME, USER_TRAINING_STATUS_TABLE_NAME, REVIEWS_TABLE_NAME
//! - NOTIFICATION_TOPIC_ARN
//! - MEDIACONVERT_ROLE_ARN, MEDIACONVERT_QUEUE_ARN, MEDIACONVERT_ENDPOINT

use otis::adapters::aws::dynamodb::DynamoAdapter;
use otis::adapters::aws::mediaconvert::MediaConvertAdapter;
use otis::adapters::aws::s3::S3Adapter;
use otis::adapters::aws::sns::SnsAdapter;
use otis::adapters::http::{router, AppState};
use otis::application::intake::UploadIntakeService;
use otis::application::submission::SubmissionService;
use otis::application::viewer::ViewerService;
use otis::application::workflow::{SpawnTrigger, TranscodeWorkflow};
use otis::config::AwsConfig;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let config = AwsConfig::from_env();

    tracing_subscriber::fmt::init();

    // Load AWS config
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    // Create AWS clients
    let s3_client = aws_sdk_s3::Client::new(&sdk_config);
    let dynamo_client = aws_sdk_dynamodb::Client::new(&sdk_config);
    let sns_client = aws_sdk_sns::Client::new(&sdk_config);
    let mediaconvert_client = match &config.mediaconvert_endpoint {
        Some(endpoint) => {
            let mc_config = aws_sdk_mediaconvert::config::Builder::from(&sdk_config)
                .endpoint_url(endpoint)
                .build();
            aws_sdk_mediaconvert::Client::from_conf(mc_config)
        }
        None => aws_sdk_mediaconvert::Client::new(&sdk_config),
    };

    // Create adapters
    let storage = S3Adapter::new(s3_client, config.upload_bucket.clone());
    let store = DynamoAdapter::new(
        dynamo_client,
        config.trainings_table.clone(),
        config.user_status_table.clone(),
        config.reviews_table.clone(),
    );
    let transcoder = MediaConvertAdapter::new(
        mediaconvert_client,
        config.mediaconvert_role_arn.clone(),
        config.mediaconvert_queue_arn.clone(),
    );
    let notifier = SnsAdapter::new(sns_client, config.notification_topic_arn.clone());

    // Application services
    let workflow = Arc::new(TranscodeWorkflow::new(
        transcoder,
        store.clone(),
        notifier,
        config.workflow.clone(),
    ));

    let state = AppState {
        intake: Arc::new(UploadIntakeService::new(
            storage,
            Duration::from_secs(config.presign_expiry_secs),
        )),
        submission: Arc::new(SubmissionService::new(
            store.clone(),
            SpawnTrigger::new(workflow),
        )),
        viewer: Arc::new(ViewerService::new(store.clone())),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port))
        .await
        .expect("Failed to bind TCP listener");
    println!("Listening at {}:{}", config.addr, config.port);
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
