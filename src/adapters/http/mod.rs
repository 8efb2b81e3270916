//! HTTP inbound adapter.
//!
//! One axum router shared by the local and AWS deployments. Caller
//! identity arrives in the `x-amzn-oidc-data` header set by the load
//! balancer in front; see `oidc`.

mod error;
mod handlers;
pub mod oidc;

pub use error::ApiError;

use crate::application::intake::UploadIntakeService;
use crate::application::submission::SubmissionService;
use crate::application::viewer::ViewerService;
use crate::application::workflow::SpawnTrigger;
use crate::ports::notifier::NotifierPort;
use crate::ports::repository::{ReviewRepository, TrainingRepository, UserStatusRepository};
use crate::ports::storage::StoragePort;
use crate::ports::transcoder::TranscodePort;
use axum::routing::{get, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub struct AppState<S, T, R, N> {
    pub intake: Arc<UploadIntakeService<S>>,
    pub submission: Arc<SubmissionService<R, SpawnTrigger<T, R, N>>>,
    pub viewer: Arc<ViewerService<R>>,
}

impl<S, T, R, N> Clone for AppState<S, T, R, N> {
    fn clone(&self) -> Self {
        Self {
            intake: self.intake.clone(),
            submission: self.submission.clone(),
            viewer: self.viewer.clone(),
        }
    }
}

pub fn router<S, T, R, N>(state: AppState<S, T, R, N>) -> Router
where
    S: StoragePort + 'static,
    T: TranscodePort + 'static,
    R: TrainingRepository + UserStatusRepository + ReviewRepository + Clone + 'static,
    N: NotifierPort + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/training",
            get(handlers::get_training::<S, T, R, N>).post(handlers::create_training::<S, T, R, N>),
        )
        .route("/training/list", get(handlers::list_trainings::<S, T, R, N>))
        .route(
            "/training/status",
            put(handlers::update_training_status::<S, T, R, N>),
        )
        .route(
            "/video/presigned-url",
            get(handlers::presigned_url::<S, T, R, N>),
        )
        .route(
            "/review",
            get(handlers::list_reviews::<S, T, R, N>).post(handlers::create_review::<S, T, R, N>),
        )
        .layer(cors)
        .with_state(state)
}
