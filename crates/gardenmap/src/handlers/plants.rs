//! Plant palette handlers.

use anyhow::Context;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use gardenmap_core::record::{parse_plant, parse_plants, PlantList};

use crate::{
    handlers::{json_body, run_blocking, status, AppError, StatusResponse},
    state::AppState,
};

/// List the palette (GET /plants).
pub async fn list_plants(State(state): State<AppState>) -> Result<Json<PlantList>, AppError> {
    let list = run_blocking(&state.palette, |store| store.list_wrapped())
        .await
        .context("failed to read data")?;

    Ok(Json(list))
}

/// Add one plant or an array of plants (POST /plants).
pub async fn create_plants(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let plants = parse_plants(json_body(body)?)?;
    let count = plants.len();

    run_blocking(&state.palette, move |store| store.append(&plants))
        .await
        .context("failed to write data")?;

    tracing::debug!(count, "Added plants");
    Ok(status("success"))
}

/// Replace a plant by id, or add it when unknown (PUT /plants).
pub async fn update_plant(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let plant = parse_plant(json_body(body)?)?;

    run_blocking(&state.palette, move |store| store.upsert_one(&plant))
        .await
        .context("failed to write data")?;

    Ok(status("updated"))
}
