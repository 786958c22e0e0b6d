//! Dashboard handler: the single page of the explorer.

use axum::{extract::State, response::Html};
use crate::state::SharedState;
use crate::views::layout::{render_dashboard, render_loading_page};

pub async fn dashboard(State(state): State<SharedState>) -> Html<String> {
    let load = state.dashboard.load_state();

    // Nothing committed yet: show the loading screen until the first dataset lands
    if load.loading && load.loaded_at.is_none() {
        return Html(render_loading_page());
    }

    Html(render_dashboard(
        state.dashboard.catalog(),
        &state.dashboard.selection(),
        &load,
        &state.dashboard.viewer_status(),
    ))
}
