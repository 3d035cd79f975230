pub mod error;
pub mod garden;
pub mod health;
pub mod plants;

use std::sync::Arc;

use anyhow::Context;
use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;

use gardenmap_core::record::RequestError;
use gardenmap_core::storage::RecordStore;

pub use error::AppError;

/// Runs a store operation on the blocking pool.
///
/// Store calls may wait on a file lock or a SQLite busy handler, so they
/// never run on the async workers.
pub(crate) async fn run_blocking<T, F>(store: &Arc<dyn RecordStore>, op: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn RecordStore) -> gardenmap_core::storage::Result<T> + Send + 'static,
{
    let store = Arc::clone(store);
    let result = tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .context("storage task panicked")?;
    Ok(result?)
}

/// Unwraps a JSON body. Oversized bodies map to `PayloadTooLarge`; every
/// other extractor rejection maps to `InvalidBody`.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::debug!(error = %rejection, "Request body over limit");
            Err(RequestError::PayloadTooLarge.into())
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected JSON body");
            Err(RequestError::InvalidBody.into())
        }
    }
}

/// Acknowledgement returned by every write endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

pub(crate) fn status(status: &'static str) -> Json<StatusResponse> {
    Json(StatusResponse { status })
}
