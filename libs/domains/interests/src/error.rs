use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterestError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    /// Edges were cleared but re-linking stopped at `interest_id`.
    #[error("Interest set of user {user_id} only partially written (failed at {interest_id}): {reason}")]
    PartialWrite {
        user_id: String,
        interest_id: String,
        reason: String,
    },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InterestResult<T> = Result<T, InterestError>;

impl From<neo4rs::Error> for InterestError {
    fn from(err: neo4rs::Error) -> Self {
        InterestError::Store(err.to_string())
    }
}

impl From<neo4rs::DeError> for InterestError {
    fn from(err: neo4rs::DeError) -> Self {
        InterestError::Store(format!("unexpected row shape: {err}"))
    }
}

impl From<reqwest::Error> for InterestError {
    fn from(err: reqwest::Error) -> Self {
        InterestError::Embedding(err.to_string())
    }
}

impl From<validator::ValidationErrors> for InterestError {
    fn from(err: validator::ValidationErrors) -> Self {
        InterestError::Validation(err.to_string())
    }
}

/// Convert InterestError to AppError for standardized error responses
impl From<InterestError> for AppError {
    fn from(err: InterestError) -> Self {
        match err {
            InterestError::Validation(msg) => AppError::BadRequest(msg),
            InterestError::Store(msg) => AppError::Store(msg),
            err @ InterestError::PartialWrite { .. } => AppError::PartialWrite(err.to_string()),
            InterestError::Embedding(msg) => AppError::Embedding(msg),
            InterestError::Config(msg) | InterestError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for InterestError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = InterestError::Validation("limit must be at least 1".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_partial_write_maps_to_server_error() {
        let err = InterestError::PartialWrite {
            user_id: "u1".into(),
            interest_id: "chess".into(),
            reason: "store unavailable".into(),
        };
        let AppError::PartialWrite(msg) = AppError::from(err) else {
            panic!("expected a partial write error");
        };
        assert!(msg.contains("chess"));
    }
}
