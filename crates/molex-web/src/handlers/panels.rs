//! Panel fragment, re-fetched by the page script after dataset events.

use axum::{extract::State, response::Html};
use crate::state::SharedState;
use crate::views::layout::render_panels;

pub async fn panels_partial(State(state): State<SharedState>) -> Html<String> {
    let load = state.dashboard.load_state();
    if load.loading {
        return Html(r#"<div class="card loading-panel"><div class="spinner"></div><p>Loading molecular data...</p></div>"#.to_string());
    }
    Html(render_panels(&load.dataset, &state.dashboard.selection(), &load))
}
