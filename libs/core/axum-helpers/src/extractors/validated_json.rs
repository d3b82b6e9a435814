//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Malformed bodies are rejected through [`AppError::JsonExtractorRejection`] and
/// failed validation through [`AppError::ValidationError`], so both come back in
/// the standard error envelope.
///
/// # Example
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct InterestInput {
///     #[validate(length(min = 1))]
///     id: String,
/// }
///
/// async fn handler(ValidatedJson(input): ValidatedJson<InterestInput>) -> String {
///     input.id
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1))]
        name: String,
    }

    async fn echo(ValidatedJson(payload): ValidatedJson<Payload>) -> String {
        payload.name
    }

    fn request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload_passes_through() {
        let app = Router::new().route("/", post(echo));
        let response = app.oneshot(request(r#"{"name":"chess"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"chess");
    }

    #[tokio::test]
    async fn test_invalid_payload_is_rejected_with_details() {
        let app = Router::new().route("/", post(echo));
        let response = app.oneshot(request(r#"{"name":""}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert!(json["details"]["name"].is_array());
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let app = Router::new().route("/", post(echo));
        let response = app.oneshot(request("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
