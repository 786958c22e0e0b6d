//! JSON API: selection, dataset, row activation, overlays and viewer status.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use molex_common::{color_for, ApiError};
use molex_molecules::{Overlay, ViewerStatus};
use serde::Deserialize;
use serde_json::{json, Value};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SelectProtein {
    pub protein: String,
}

#[derive(Debug, Deserialize)]
pub struct OverlayToggle {
    pub overlay: Overlay,
    pub enabled: bool,
}

fn bad_request(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

/// GET /api/state
pub async fn api_state(State(state): State<SharedState>) -> Json<Value> {
    let load = state.dashboard.load_state();
    Json(json!({
        "selection": state.dashboard.selection(),
        "loading":   load.loading,
        "error":     load.error,
        "rows":      load.dataset.len(),
        "loaded_at": load.loaded_at,
    }))
}

/// GET /api/dataset
pub async fn api_dataset(State(state): State<SharedState>) -> Json<Value> {
    let load = state.dashboard.load_state();
    Json(json!({
        "protein": load.protein,
        "records": &*load.dataset,
    }))
}

/// POST /api/protein
pub async fn api_select_protein(
    State(state): State<SharedState>,
    payload: Result<Json<SelectProtein>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload.map_err(bad_request)?;
    // Reloads run in the background; clients follow progress over SSE.
    let _tasks = state.dashboard.select_protein(&req.protein)?;
    Ok(Json(json!({
        "status": "ok",
        "selection": state.dashboard.selection(),
    })))
}

/// POST /api/rows/{compound_id}/activate
pub async fn api_activate_row(
    State(state): State<SharedState>,
    Path(compound_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let record = state.dashboard.activate_compound(&compound_id).await?;
    let color = color_for(&record.toxicity);
    Ok(Json(json!({
        "status": "ok",
        "record": record,
        "color":  color.css,
        "class":  color.class,
    })))
}

/// POST /api/overlays
pub async fn api_overlay(
    State(state): State<SharedState>,
    payload: Result<Json<OverlayToggle>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload.map_err(bad_request)?;
    state.dashboard.set_overlay(req.overlay, req.enabled).await;
    Ok(Json(json!({
        "status": "ok",
        "overlays": state.dashboard.viewer_status().overlays,
    })))
}

/// GET /api/viewer
pub async fn api_viewer(State(state): State<SharedState>) -> Json<ViewerStatus> {
    Json(state.dashboard.viewer_status())
}
