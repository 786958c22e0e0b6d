//! Page shell, loading screen and the panel grid.

use molex_common::{Dataset, ProteinCatalog};
use molex_ingestion::LoadState;
use molex_molecules::{Overlay, ViewerStatus};

use super::{escape_html, render_assay_table, render_bar_chart, render_pie_chart};
use crate::orchestrator::Selection;

/// Navigation HTML template shared across all pages
pub const NAV_HTML: &str = include_str!("../../templates/nav.html");

const MOLSTAR_JS: &str = "https://cdn.jsdelivr.net/npm/molstar@4/build/viewer/molstar.js";
const MOLSTAR_CSS: &str = "https://cdn.jsdelivr.net/npm/molstar@4/build/viewer/molstar.css";

fn head(title: &str, extra: &str) -> String {
    format!(r#"<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{} — Molex</title>
    <link rel="stylesheet" href="/static/css/main.css?v=0.1.0">{}
</head>"#, title, extra)
}

/// Full-page placeholder shown while a dataset is loading. Reloads itself.
pub fn render_loading_page() -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
{}
<body>
<div class="loading-screen">
    <div class="spinner"></div>
    <p>Loading molecular data...</p>
</div>
</body>
</html>"#, head("Loading", r#"
    <meta http-equiv="refresh" content="1">"#))
}

/// Table and both charts; also served alone as `/partials/panels`.
pub fn render_panels(dataset: &Dataset, selection: &Selection, load: &LoadState) -> String {
    let banner = match &load.error {
        Some(error) => format!(
            r#"<div class="alert alert-danger">Could not load assay data: {}</div>"#,
            escape_html(error)
        ),
        None => String::new(),
    };

    format!(r#"{banner}
<div class="card">
    <div class="card-header">
        <div>Compound Assay Results</div>
        <span class="badge badge-outline">{rows} compounds</span>
    </div>
    {table}
</div>
<div class="grid-2">
    <div class="card">
        <div class="card-header">
            <div>IC50 Distribution</div>
            <span class="text-muted small">Lower IC50 = higher potency</span>
        </div>
        {bar}
    </div>
    <div class="card">
        <div class="card-header"><div>Toxicity Distribution</div></div>
        {pie}
    </div>
</div>"#,
        rows = dataset.len(),
        table = render_assay_table(dataset, selection),
        bar = render_bar_chart(dataset),
        pie = render_pie_chart(dataset),
    )
}

fn protein_options(catalog: &ProteinCatalog, selection: &Selection) -> String {
    catalog.entries().iter().map(|entry| {
        format!(r#"<option value="{}"{}>{}</option>"#,
            entry.id,
            if entry.id == selection.protein { " selected" } else { "" },
            escape_html(&entry.label()),
        )
    }).collect()
}

fn overlay_toggles(viewer: &ViewerStatus) -> String {
    Overlay::ALL.iter().map(|overlay| {
        let on = viewer.overlays.contains(overlay);
        format!(r#"<button class="btn btn-outline btn-sm overlay-toggle{}" data-overlay="{}" aria-pressed="{}">{}</button>"#,
            if on { " active" } else { "" },
            overlay.key(),
            on,
            overlay.label(),
        )
    }).collect::<Vec<_>>().join("\n            ")
}

pub fn render_dashboard(
    catalog: &ProteinCatalog,
    selection: &Selection,
    load: &LoadState,
    viewer: &ViewerStatus,
) -> String {
    let name = catalog
        .get(&selection.protein)
        .map(|e| e.name.clone())
        .unwrap_or_default();
    // Only a committed scene is handed to the browser; a pending load
    // arrives later as a `structure_shown` command.
    let (scene, structure_url) = match viewer.scene {
        Some(scene) => (scene.to_string(), viewer.structure_url.as_deref().unwrap_or_default()),
        None => (String::new(), ""),
    };

    format!(r#"<!DOCTYPE html>
<html lang="en">
{head}
<body>
<div class="app-container">
{nav}
<main class="main-content">
    <div class="page-header">
        <div>
            <h1 class="page-title">Molecular Assay Explorer</h1>
            <p class="text-muted">Target structure and compound assay results</p>
        </div>
        <label class="protein-select">
            <span>Target protein</span>
            <select id="protein-select">
                {options}
            </select>
        </label>
    </div>

    <div class="grid-2 dashboard-grid">
        <div class="card viewer-card">
            <div class="card-header">
                <div>{protein} <span class="text-muted">{name}</span></div>
                <div class="d-flex gap-3">
            {toggles}
                </div>
            </div>
            <div id="viewer" class="viewer" data-scene="{scene}" data-structure-url="{url}" data-format="{format}" data-color="{color}"></div>
        </div>
        <div id="panels">
{panels}
        </div>
    </div>
</main>
</div>
<script src="{molstar_js}"></script>
<script src="/static/js/viewer.js"></script>
<script src="/static/js/dashboard.js"></script>
</body>
</html>"#,
        head = head("Dashboard", &format!(r#"
    <link rel="stylesheet" href="{MOLSTAR_CSS}">"#)),
        nav = NAV_HTML,
        options = protein_options(catalog, selection),
        protein = selection.protein,
        name = escape_html(&name),
        toggles = overlay_toggles(viewer),
        scene = scene,
        url = escape_html(structure_url),
        format = viewer.format.tag(),
        color = viewer.color.to_css(),
        panels = render_panels(&load.dataset, selection, load),
        molstar_js = MOLSTAR_JS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use molex_common::{color_for, AssayRecord, ProteinId, Toxicity};
    use molex_molecules::{SceneHandle, StructureFormat, ViewerPhase};
    use std::sync::Arc;

    fn viewer(overlays: Vec<Overlay>) -> ViewerStatus {
        ViewerStatus {
            phase: ViewerPhase::Loaded,
            protein: Some(ProteinId::parse("1HSG").unwrap()),
            scene: Some(SceneHandle::new()),
            structure_url: Some("https://files.rcsb.org/download/1HSG.pdb".into()),
            format: StructureFormat::Pdb,
            toxicity: Toxicity::Low,
            color: color_for(&Toxicity::Low).rgb,
            overlays,
            camera: None,
            summary: None,
        }
    }

    #[test]
    fn test_dashboard_page() {
        let catalog = ProteinCatalog::default();
        let selection = Selection::new(ProteinId::parse("1HSG").unwrap());
        let load = LoadState {
            dataset: Arc::new(Dataset::new(vec![AssayRecord::new("H1", 3.0, Toxicity::Low)])),
            ..Default::default()
        };
        let html = render_dashboard(&catalog, &selection, &load, &viewer(vec![Overlay::HBonds]));

        assert!(html.contains(r#"<option value="1HSG" selected>"#));
        assert_eq!(html.matches("<option").count(), 3);
        assert!(html.contains(r#"data-structure-url="https://files.rcsb.org/download/1HSG.pdb""#));
        assert!(html.contains(r#"overlay-toggle active" data-overlay="hbonds""#));
        assert!(html.contains(r#"overlay-toggle" data-overlay="surface""#));
        assert!(html.contains("HIV-1 Protease"));
        assert!(html.contains(r#"data-compound="H1""#));
    }

    #[test]
    fn test_pending_structure_not_handed_to_browser() {
        let catalog = ProteinCatalog::default();
        let selection = Selection::new(ProteinId::parse("1HSG").unwrap());
        let mut status = viewer(Vec::new());
        status.phase = ViewerPhase::Loading;
        status.scene = None;
        let html = render_dashboard(&catalog, &selection, &LoadState::default(), &status);
        assert!(html.contains(r#"data-scene="" data-structure-url="""#));
    }

    #[test]
    fn test_panel_headers_and_error_banner() {
        let selection = Selection::new(ProteinId::parse("6LU7").unwrap());
        let load = LoadState {
            error: Some("Fetch error: 404".into()),
            ..Default::default()
        };
        let html = render_panels(&Dataset::empty(), &selection, &load);
        for header in ["Compound Assay Results", "IC50 Distribution", "Toxicity Distribution"] {
            assert!(html.contains(header), "missing {header}");
        }
        assert!(html.contains("Could not load assay data: Fetch error: 404"));
        assert!(html.contains("0 compounds"));
    }

    #[test]
    fn test_loading_page() {
        assert!(render_loading_page().contains("Loading molecular data..."));
    }
}
