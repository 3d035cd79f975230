//! Garden layout handlers.
//!
//! Updates carry the full placement of each item and merge into the stored
//! item with the same `id`.

use anyhow::Context;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use gardenmap_core::record::{
    parse_delete_ids, parse_garden_updates, parse_new_garden_items, PlantList,
};

use crate::{
    handlers::{json_body, run_blocking, status, AppError, StatusResponse},
    state::AppState,
};

/// List placed items (GET /garden).
pub async fn list_garden(State(state): State<AppState>) -> Result<Json<PlantList>, AppError> {
    let list = run_blocking(&state.garden, |store| store.list_wrapped())
        .await
        .context("failed to read data")?;

    Ok(Json(list))
}

/// Place one item or an array of items (POST /garden).
pub async fn create_garden_items(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let items = parse_new_garden_items(json_body(body)?)?;
    let count = items.len();

    run_blocking(&state.garden, move |store| store.append(&items))
        .await
        .context("failed to write data")?;

    tracing::debug!(count, "Placed garden items");
    Ok(status("success"))
}

/// Merge complete items into existing ones (PUT /garden).
pub async fn update_garden_items(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let updates = parse_garden_updates(json_body(body)?)?;

    run_blocking(&state.garden, move |store| store.upsert_many(&updates))
        .await
        .context("failed to write data")?;

    Ok(status("updated"))
}

/// Remove items by id (DELETE /garden).
pub async fn delete_garden_items(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let ids = parse_delete_ids(json_body(body)?)?;
    let count = ids.len();

    run_blocking(&state.garden, move |store| store.delete_by_ids(&ids))
        .await
        .context("failed to write data")?;

    tracing::debug!(count, "Deleted garden items");
    Ok(status("deleted"))
}
