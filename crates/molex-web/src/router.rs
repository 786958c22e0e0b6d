//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    services::ServeDir,
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use crate::state::SharedState;
use crate::handlers::{
    dashboard::dashboard,
    panels::panels_partial,
    api::{api_state, api_dataset, api_select_protein, api_activate_row, api_overlay, api_viewer},
};
use crate::sse::sse_handler;

/// Build and return the full Axum router.
pub fn build_router(state: SharedState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let data = &state.config.data;

    let mut router = Router::new()
        // Pages
        .route("/",                get(dashboard))
        .route("/partials/panels", get(panels_partial))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // API endpoints
        .route("/api/state",   get(api_state))
        .route("/api/dataset", get(api_dataset))
        .route("/api/protein", post(api_select_protein))
        .route("/api/rows/{compound_id}/activate", post(api_activate_row))
        .route("/api/overlays", post(api_overlay))
        .route("/api/viewer",   get(api_viewer))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir));

    // CSV resources are only served when they live on this machine
    if !data.is_remote() {
        router = router.nest_service("/data", ServeDir::new(&data.assay_base));
    }

    router
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
