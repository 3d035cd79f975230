//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/readyz` - Readiness probe (both stores can be read)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{handlers::run_blocking, state::AppState};

/// GET /livez - Basic liveness probe.
///
/// Returns 200 immediately. Used to check if the server is accepting connections.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /readyz - Readiness probe.
///
/// Lists both collections. Returns 200 when both reads succeed, 503 with the
/// first failure otherwise.
#[axum::debug_handler]
pub async fn readyz(State(state): State<AppState>) -> Response {
    for (name, store) in [("palette", &state.palette), ("garden", &state.garden)] {
        if let Err(e) = run_blocking(store, |store| store.list_all()).await {
            tracing::warn!(store = name, error = %e, "Readiness check failed");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "healthy": false,
                    "error": format!("{name}: {e}")
                })),
            )
                .into_response();
        }
    }

    (StatusCode::OK, Json(json!({ "healthy": true }))).into_response()
}
