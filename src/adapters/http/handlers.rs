//! Endpoint handlers. Wire convention: PascalCase item attributes inside
//! camelCase wrapper keys.

use super::error::ApiError;
use super::oidc::UserClaims;
use super::AppState;
use crate::domain::training::{Review, TrainingSummary};
use crate::domain::transcode::SourceLocation;
use crate::domain::upload::UploadTarget;
use crate::ports::notifier::NotifierPort;
use crate::ports::repository::{ReviewRepository, TrainingRepository, UserStatusRepository};
use crate::ports::storage::StoragePort;
use crate::ports::transcoder::TranscodePort;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TrainingQuery {
    #[serde(rename = "trainingId")]
    pub training_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TrainingSummaryDto {
    training_id: String,
    title: String,
    description: String,
}

impl From<TrainingSummary> for TrainingSummaryDto {
    fn from(summary: TrainingSummary) -> Self {
        Self {
            training_id: summary.training_id,
            title: summary.title,
            description: summary.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TrainingListResponse {
    trainings: Vec<TrainingSummaryDto>,
}

pub async fn list_trainings<S, T, R, N>(
    State(state): State<AppState<S, T, R, N>>,
) -> Result<Json<TrainingListResponse>, ApiError>
where
    S: StoragePort + 'static,
    T: TranscodePort + 'static,
    R: TrainingRepository + UserStatusRepository + ReviewRepository + 'static,
    N: NotifierPort + 'static,
{
    let trainings = state
        .viewer
        .list_trainings()
        .await?
        .into_iter()
        .map(TrainingSummaryDto::from)
        .collect();
    Ok(Json(TrainingListResponse { trainings }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TrainingInfoDto {
    training_id: String,
    title: String,
    description: String,
    video_key: Option<String>,
    status: String,
    is_completed: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct TrainingInfoResponse {
    #[serde(rename = "trainingInfo")]
    training_info: TrainingInfoDto,
}

pub async fn get_training<S, T, R, N>(
    State(state): State<AppState<S, T, R, N>>,
    claims: UserClaims,
    Query(query): Query<TrainingQuery>,
) -> Result<Json<TrainingInfoResponse>, ApiError>
where
    S: StoragePort + 'static,
    T: TranscodePort + 'static,
    R: TrainingRepository + UserStatusRepository + ReviewRepository + 'static,
    N: NotifierPort + 'static,
{
    let detail = state
        .viewer
        .get_training(&query.training_id, &claims.email)
        .await?;
    Ok(Json(TrainingInfoResponse {
        training_info: TrainingInfoDto {
            training_id: detail.record.training_id,
            title: detail.record.title,
            description: detail.record.description,
            video_key: detail.record.video_asset_key,
            status: detail.record.status.to_string(),
            is_completed: detail.is_completed,
        },
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainingRequest {
    training_title: String,
    training_description: String,
    training_video_s3_bucket: String,
    training_video_s3_key: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateTrainingResponse {
    #[serde(rename = "trainingId")]
    training_id: String,
}

pub async fn create_training<S, T, R, N>(
    State(state): State<AppState<S, T, R, N>>,
    Json(request): Json<CreateTrainingRequest>,
) -> Result<Json<CreateTrainingResponse>, ApiError>
where
    S: StoragePort + 'static,
    T: TranscodePort + 'static,
    R: TrainingRepository + UserStatusRepository + ReviewRepository + 'static,
    N: NotifierPort + 'static,
{
    let source = SourceLocation::new(
        request.training_video_s3_bucket,
        request.training_video_s3_key,
    );
    let training_id = state
        .submission
        .submit(&request.training_title, &request.training_description, source)
        .await?;
    Ok(Json(CreateTrainingResponse { training_id }))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(rename = "trainingId")]
    training_id: String,
}

pub async fn update_training_status<S, T, R, N>(
    State(state): State<AppState<S, T, R, N>>,
    claims: UserClaims,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<StatusCode, ApiError>
where
    S: StoragePort + 'static,
    T: TranscodePort + 'static,
    R: TrainingRepository + UserStatusRepository + ReviewRepository + 'static,
    N: NotifierPort + 'static,
{
    state
        .viewer
        .mark_complete(&claims.email, &request.training_id)
        .await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Serialize)]
pub(crate) struct PresignedUrlResponse {
    #[serde(rename = "presignedUrlInfo")]
    presigned_url_info: UploadTarget,
}

pub async fn presigned_url<S, T, R, N>(
    State(state): State<AppState<S, T, R, N>>,
) -> Result<Json<PresignedUrlResponse>, ApiError>
where
    S: StoragePort + 'static,
    T: TranscodePort + 'static,
    R: TrainingRepository + UserStatusRepository + ReviewRepository + 'static,
    N: NotifierPort + 'static,
{
    let target = state.intake.request_upload_target().await?;
    Ok(Json(PresignedUrlResponse {
        presigned_url_info: target,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ReviewDto {
    training_id: String,
    email: String,
    rating: u8,
    comment: String,
    created_at: String,
}

impl From<Review> for ReviewDto {
    fn from(review: Review) -> Self {
        Self {
            training_id: review.training_id,
            email: review.email,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewsResponse {
    reviews: Vec<ReviewDto>,
}

pub async fn list_reviews<S, T, R, N>(
    State(state): State<AppState<S, T, R, N>>,
    Query(query): Query<TrainingQuery>,
) -> Result<Json<ReviewsResponse>, ApiError>
where
    S: StoragePort + 'static,
    T: TranscodePort + 'static,
    R: TrainingRepository + UserStatusRepository + ReviewRepository + 'static,
    N: NotifierPort + 'static,
{
    let reviews = state
        .viewer
        .list_reviews(&query.training_id)
        .await?
        .into_iter()
        .map(ReviewDto::from)
        .collect();
    Ok(Json(ReviewsResponse { reviews }))
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    #[serde(rename = "trainingId")]
    training_id: String,
    rating: u8,
    comment: String,
}

pub async fn create_review<S, T, R, N>(
    State(state): State<AppState<S, T, R, N>>,
    claims: UserClaims,
    Json(request): Json<CreateReviewRequest>,
) -> Result<StatusCode, ApiError>
where
    S: StoragePort + 'static,
    T: TranscodePort + 'static,
    R: TrainingRepository + UserStatusRepository + ReviewRepository + 'static,
    N: NotifierPort + 'static,
{
    state
        .viewer
        .create_review(
            &claims.email,
            &request.training_id,
            request.rating,
            &request.comment,
        )
        .await?;
    Ok(StatusCode::OK)
}
