//! End-to-end tests of the HTTP surface with on-disk CSV and PDB fixtures.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use molex_common::Config;
use molex_molecules::EngineCommand;
use molex_web::router::build_router;
use molex_web::state::{AppEvent, AppState, SharedState};
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

const PDB: &str = "\
ATOM      1  N   ALA A   1       0.000   0.000   0.000  1.00  0.00           N
ATOM      2  CA  ALA A   1       2.000   0.000   0.000  1.00  0.00           C
HETATM    3  C1  LIG A 101       0.000   4.000   0.000  1.00  0.00           C
HETATM    4  O   HOH A 201       0.000   0.000   6.000  1.00  0.00           O
END
";

const CSV_6LU7: &str = "Compound ID,IC50 (nM),Toxicity
C001,12.5,Moderate
C002,40.0,High
C003,7.25,Low
";

const CSV_1HSG: &str = "Compound ID,IC50 (nM),Toxicity
H001,3.2,Low
";

async fn setup() -> (SharedState, Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(root.join("assay_6LU7.csv"), CSV_6LU7).unwrap();
    std::fs::write(root.join("assay_1HSG.csv"), CSV_1HSG).unwrap();
    std::fs::write(root.join("6LU7.pdb"), PDB).unwrap();
    std::fs::write(root.join("1HSG.pdb"), PDB).unwrap();

    let mut config = Config::default();
    config.data.assay_base = root.display().to_string();
    config.structure.url_template = format!("{}/{{protein}}.pdb", root.display());
    config.structure.cache_dir = Some(root.join("cache").display().to_string());
    config.server.static_dir = root.join("static").display().to_string();

    let state = AppState::from_config(config).await.unwrap();
    state.dashboard.mount().join().await;
    let app = build_router(state.clone());
    (state, app, dir)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let (status, body) = send(app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK, "GET {uri}: {body}");
    serde_json::from_str(&body).unwrap()
}

/// Wait until both reloads for `protein` have been committed.
async fn wait_for(state: &SharedState, protein: &str) {
    for _ in 0..200 {
        let load = state.dashboard.load_state();
        let viewer = state.dashboard.viewer_status();
        let dataset_ready = !load.loading && load.protein.as_ref().map(|p| p.as_str()) == Some(protein);
        let viewer_ready = viewer.protein.as_ref().map(|p| p.as_str()) == Some(protein)
            && viewer.summary.is_some();
        if dataset_ready && viewer_ready {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{protein} never finished loading");
}

#[tokio::test]
async fn test_initial_state_and_pages() {
    let (_state, app, _dir) = setup().await;

    let state = get_json(&app, "/api/state").await;
    assert_eq!(state["selection"]["protein"], "6LU7");
    assert_eq!(state["selection"]["toxicity"], "Low");
    assert_eq!(state["loading"], false);
    assert_eq!(state["rows"], 3);

    let dataset = get_json(&app, "/api/dataset").await;
    assert_eq!(dataset["records"][0]["compound_id"], "C001");
    assert_eq!(dataset["records"][0]["ic50"], 12.5);
    assert_eq!(dataset["records"][0]["toxicity"], "Moderate");

    let (status, page) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Compound Assay Results"));
    assert!(page.contains(r#"data-compound="C002""#));
    assert!(page.contains(r#"data-overlay="surface""#));

    let (status, csv) = send(&app, Method::GET, "/data/assay_6LU7.csv", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(csv.starts_with("Compound ID"));
}

#[tokio::test]
async fn test_row_activation() {
    let (_state, app, _dir) = setup().await;

    let (status, body) = send(&app, Method::POST, "/api/rows/C002/activate", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["color"], "#ef4444");
    assert_eq!(json["record"]["toxicity"], "High");

    let state = get_json(&app, "/api/state").await;
    assert_eq!(state["selection"]["toxicity"], "High");
    assert_eq!(state["selection"]["focused_compound"], "C002");

    let viewer = get_json(&app, "/api/viewer").await;
    assert_eq!(viewer["phase"], "loaded");
    assert_eq!(viewer["color"], serde_json::json!({ "r": 239, "g": 68, "b": 68 }));
    assert_eq!(viewer["camera"]["center"], serde_json::json!([1.0, 2.0, 3.0]));

    let (status, body) = send(&app, Method::POST, "/api/rows/NOPE/activate", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "error");
}

#[tokio::test]
async fn test_protein_switch() {
    let (state, app, _dir) = setup().await;

    let (status, body) = send(&app, Method::POST, "/api/protein", Some(r#"{"protein":"1HSG"}"#)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    wait_for(&state, "1HSG").await;

    let dataset = get_json(&app, "/api/dataset").await;
    let ids: Vec<_> = dataset["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["compound_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["H001"]);

    let viewer = get_json(&app, "/api/viewer").await;
    assert_eq!(viewer["protein"], "1HSG");
    assert!(viewer["structure_url"].as_str().unwrap().ends_with("1HSG.pdb"));
    assert_eq!(viewer["summary"]["atoms"], 4);

    let (_, panels) = send(&app, Method::GET, "/partials/panels", None).await;
    assert!(panels.contains(r#"data-compound="H001""#));
    assert!(!panels.contains("C001"));
}

#[tokio::test]
async fn test_protein_switch_is_mirrored_over_events() {
    let (state, app, _dir) = setup().await;
    let mut rx = state.subscribe();

    send(&app, Method::POST, "/api/protein", Some(r#"{"protein":"1HSG"}"#)).await;
    wait_for(&state, "1HSG").await;

    let mut saw_selection = false;
    let mut saw_loaded = false;
    let mut saw_shown = false;
    let mut saw_cleared = false;
    // Engine commands are forwarded by a background task, so they may trail the commit.
    while !(saw_selection && saw_loaded && saw_shown && saw_cleared) {
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for events")
            .unwrap();
        match event {
            AppEvent::SelectionChanged { protein, .. } => saw_selection = protein.as_str() == "1HSG",
            AppEvent::Viewer(EngineCommand::StructureLoaded { url, .. }) => {
                saw_loaded |= url.ends_with("1HSG.pdb");
            }
            // The mount's 6LU7 commands may still be in flight when we subscribe.
            AppEvent::Viewer(EngineCommand::StructureShown { scene, url, .. }) if url.ends_with("1HSG.pdb") => {
                assert_eq!(Some(scene), state.dashboard.viewer_status().scene);
                saw_shown = true;
            }
            AppEvent::Viewer(EngineCommand::StructureCleared { .. }) => saw_cleared = true,
            _ => {}
        }
    }
    assert!(saw_selection);
    assert!(saw_loaded);
    assert!(saw_shown);
    assert!(saw_cleared);
}

#[tokio::test]
async fn test_client_errors() {
    let (_state, app, _dir) = setup().await;

    let (status, _) = send(&app, Method::POST, "/api/protein", Some(r#"{"protein":"9ZZZ"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, "/api/protein", Some(r#"{"protein":"bad id"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/api/protein", Some("{")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/api/overlays", Some(r#"{"overlay":"cartoon","enabled":true}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlay_toggle() {
    let (_state, app, _dir) = setup().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/overlays",
        Some(r#"{"overlay":"surface","enabled":true}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["overlays"], serde_json::json!(["surface"]));

    let (_, page) = send(&app, Method::GET, "/", None).await;
    assert!(page.contains(r#"overlay-toggle active" data-overlay="surface""#));
}
