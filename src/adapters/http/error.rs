use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Core(Error::Validation(_)) | ApiError::Core(Error::MalformedInput(_)) => {
                (StatusCode::BAD_REQUEST, "Validation error")
            }
            ApiError::Core(Error::NotFound(_)) => (StatusCode::NOT_FOUND, "Resource not found"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Authentication failed"),
            ApiError::Core(_) => {
                error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
