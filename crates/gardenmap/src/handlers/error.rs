use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use gardenmap_core::record::RequestError;
use gardenmap_core::storage::{storage_error_to_status_code, StorageError};

/// Application error type that wraps `anyhow::Error`.
///
/// Request and storage errors from `gardenmap_core` keep their status codes
/// when wrapped in context; anything else becomes a 500.
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_code(&self) -> StatusCode {
        let code = if let Some(request_error) = self.0.downcast_ref::<RequestError>() {
            request_error.status_code()
        } else if let Some(storage_error) = self.0.downcast_ref::<StorageError>() {
            storage_error_to_status_code(storage_error)
        } else {
            500
        };

        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = if let Some(request_error) = self.0.downcast_ref::<RequestError>() {
            tracing::warn!(status = %status, error = %request_error, "Rejected request");
            match request_error {
                RequestError::Validation(details) => {
                    json!({"error": request_error.to_string(), "details": details})
                }
                _ => json!({"error": request_error.to_string()}),
            }
        } else if let Some(storage_error) = self
            .0
            .downcast_ref::<StorageError>()
            .filter(|e| e.is_busy())
        {
            tracing::warn!(error = %storage_error, "Storage busy");
            json!({"error": "resource busy, try again later"})
        } else {
            tracing::error!(status = %status, error = ?self.0, "Application error");
            json!({"error": self.0.to_string()})
        };

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use gardenmap_core::record::{FieldErrors, ValidationDetails};
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_includes_details() {
        let mut fields = FieldErrors::default();
        fields.add("id", "Missing data for required field.");
        let error = AppError::from(RequestError::Validation(ValidationDetails::Single(fields)));

        let (status, body) = render(error).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["details"]["id"][0], "Missing data for required field.");
    }

    #[tokio::test]
    async fn test_invalid_body_is_bad_request() {
        let (status, body) = render(AppError::from(RequestError::InvalidBody)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_busy_survives_context() {
        let result: anyhow::Result<()> =
            Err(StorageError::Busy("lock".to_string())).context("failed to write data");

        let (status, body) = render(AppError(result.unwrap_err())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "resource busy, try again later");
    }

    #[tokio::test]
    async fn test_io_error_uses_context_message() {
        let result: anyhow::Result<()> =
            Err(StorageError::Io("disk full".to_string())).context("failed to write data");

        let (status, body) = render(AppError(result.unwrap_err())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "failed to write data");
    }
}
