//! molex-web: assay explorer dashboard.
//! Provides:
//!   - Protein selector driving dataset and structure reloads
//!   - Structure viewer mirrored to the browser over SSE
//!   - Assay table, IC50 bar chart and toxicity pie chart
//!   - JSON API for selection, row activation and overlays

pub mod orchestrator;
pub mod views;
pub mod handlers;
pub mod router;
pub mod state;
pub mod sse;
