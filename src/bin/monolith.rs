//! Monolith Binary - Local single-server deployment
//!
//! This is the main entry point for local development and single-server
//! deployment. It wires up:
//! - Local adapters (filesystem staging, ffmpeg CLI, Redis state)
//! - The shared HTTP API
//! - A staging upload route standing in for presigned URLs
//! - Static serving of finished HLS assets

use axum::Router;
use otis::adapters::http::{router, AppState};
use otis::adapters::local::ffmpeg::{FfmpegRunner, FfmpegTranscoder};
use otis::adapters::local::fs::LocalStorage;
use otis::adapters::local::notifier::LogNotifier;
use otis::adapters::local::redis::RedisStore;
use otis::adapters::local::upload;
use otis::application::intake::UploadIntakeService;
use otis::application::submission::SubmissionService;
use otis::application::viewer::ViewerService;
use otis::application::workflow::{SpawnTrigger, TranscodeWorkflow};
use otis::config::LocalConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;

#[tokio::main]
async fn main() {
    let config = LocalConfig::from_env();

    tracing_subscriber::fmt::init();

    // 1. Adapters (Local implementations)
    let store = match RedisStore::new(&config.redis_url) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to connect to Redis: {:?}", e);
            std::process::exit(1);
        }
    };

    let storage = LocalStorage::new(&config.staging_dir, &config.public_base_url);
    let transcoder = FfmpegTranscoder::new(FfmpegRunner, &config.serving_dir);

    // 2. Application Services
    let workflow = Arc::new(TranscodeWorkflow::new(
        transcoder,
        store.clone(),
        LogNotifier,
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

    // 3. HTTP Layer: API + staging uploads + finished assets
    let app = Router::new()
        .merge(router(state))
        .merge(upload::staging_router(PathBuf::from(&config.staging_dir)))
        .fallback_service(ServeDir::new(&config.serving_dir));

    // 4. Start Server
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port))
        .await
        .expect("Failed to bind TCP listener");
    println!("Listening at {}:{}", config.addr, config.port);
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
