use application::errors::UseCaseError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    /// Set when the same request may succeed if repeated.
    pub retryable: bool,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    UseCase(#[from] UseCaseError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, retryable) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, false),
            AppError::UseCase(err) => {
                let status = err.status_code();
                if status.is_server_error() {
                    error!(error = ?err, status = %status, "request failed");
                } else {
                    warn!(reason = %err, status = %status, "request rejected");
                }
                (status, err.public_message(), err.is_retryable())
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
            retryable,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn conflict_maps_to_409_with_its_reason() {
        let (status, body) =
            body_of(UseCaseError::Conflict("email already registered".to_string()).into()).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 409);
        assert_eq!(body["message"], "email already registered");
        assert_eq!(body["retryable"], true);
    }

    #[tokio::test]
    async fn store_errors_hide_their_cause() {
        let (status, body) =
            body_of(UseCaseError::Store(anyhow::anyhow!("connection refused")).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "internal server error");
        assert_eq!(body["retryable"], false);
    }

    #[tokio::test]
    async fn not_found_and_bad_request() {
        let (status, body) = body_of(UseCaseError::NotFound("order".to_string()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "order not found");

        let (status, _) = body_of(AppError::BadRequest("missing header".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
