use http::StatusCode;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("payment gateway error")]
    Gateway(#[source] anyhow::Error),
    #[error("notification delivery failed")]
    Notification(#[source] anyhow::Error),
    #[error("internal error")]
    Store(#[source] anyhow::Error),
}

impl UseCaseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UseCaseError::Validation(_) => StatusCode::BAD_REQUEST,
            UseCaseError::Auth(_) => StatusCode::UNAUTHORIZED,
            UseCaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UseCaseError::Conflict(_) => StatusCode::CONFLICT,
            UseCaseError::Gateway(_) | UseCaseError::Notification(_) => StatusCode::BAD_GATEWAY,
            UseCaseError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, UseCaseError::Gateway(_) | UseCaseError::Conflict(_))
    }

    /// Message safe to show to the caller. Store and gateway detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            UseCaseError::Gateway(_) => {
                "payment provider is unavailable, please retry".to_string()
            }
            UseCaseError::Store(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, UseCaseError>;

/// `map_err` adapter for repository failures: logs the cause and wraps it.
pub fn store_error(context: &'static str) -> impl FnOnce(anyhow::Error) -> UseCaseError {
    move |err| {
        error!(db_error = ?err, "{}", context);
        UseCaseError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_details_are_not_exposed() {
        let err = UseCaseError::Store(anyhow::anyhow!("duplicate key value violates constraint"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "internal server error");

        let err = UseCaseError::Gateway(anyhow::anyhow!("stripe returned 500"));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(!err.public_message().contains("stripe"));
        assert!(err.is_retryable());
    }

    #[test]
    fn caller_errors_keep_their_reason() {
        let err = UseCaseError::Validation("cart is empty".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "cart is empty");

        let err = UseCaseError::NotFound("product".to_string());
        assert_eq!(err.public_message(), "product not found");
    }
}
