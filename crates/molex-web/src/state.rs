//! Shared application state for the web server.

use anyhow::Context;
use molex_common::{Config, ProteinId, Toxicity};
use molex_ingestion::{source_from_config, AssaySource, DatasetLoader};
use molex_molecules::pdb::StructureFetcher;
use molex_molecules::{
    EngineCommand, SceneEngine, StructureEngine, StructureFormat, StructureUrls, StructureViewer,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::orchestrator::Dashboard;

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// The user picked another protein
    SelectionChanged { protein: ProteinId, toxicity: Toxicity },
    /// A dataset load was committed
    DatasetLoaded { protein: ProteinId, rows: usize },
    DatasetFailed { protein: ProteinId, error: String },
    /// A table row was activated
    CompoundFocused { compound_id: String, toxicity: Toxicity, color: String },
    /// Mirrored visualization-engine command
    Viewer(EngineCommand),
    /// General notification
    Notification { level: String, message: String },
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: Config,
    pub dashboard: Dashboard,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<AppEvent>,
}

impl AppState {
    /// Build the in-process scene engine and the configured assay source.
    pub async fn from_config(config: Config) -> anyhow::Result<SharedState> {
        let cache_dir = config
            .structure
            .cache_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(StructureFetcher::default_cache_dir);
        let fetcher = StructureFetcher::new(
            cache_dir,
            Duration::from_secs(config.structure.request_timeout_secs),
        )?;
        let engine = Arc::new(SceneEngine::new(fetcher));
        let (event_tx, _) = broadcast::channel(256);
        mirror_engine(&engine, event_tx.clone());

        let source = source_from_config(&config.data)?;
        Self::new(config, engine, source, event_tx).await
    }

    /// Mount the viewer on `engine` and assemble the dashboard.
    pub async fn new(
        config: Config,
        engine: Arc<dyn StructureEngine>,
        source: Arc<dyn AssaySource>,
        event_tx: broadcast::Sender<AppEvent>,
    ) -> anyhow::Result<SharedState> {
        let catalog = config.catalog()?;
        let format = StructureFormat::from_tag(&config.structure.format)?;
        let urls = StructureUrls::new(config.structure.url_template.clone(), format);
        let viewer = StructureViewer::mount(engine, urls)
            .await
            .context("Failed to mount structure viewer")?;

        let loader = Arc::new(DatasetLoader::new(source));
        let dashboard = Dashboard::new(catalog, loader, Arc::new(viewer), event_tx.clone());
        Ok(Arc::new(Self {
            config,
            dashboard,
            event_tx,
        }))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }
}

/// Forward every engine command to SSE clients until the engine goes away.
pub fn mirror_engine(engine: &SceneEngine, event_tx: broadcast::Sender<AppEvent>) {
    let mut commands = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match commands.recv().await {
                Ok(command) => {
                    let _ = event_tx.send(AppEvent::Viewer(command));
                }
                Err(RecvError::Lagged(n)) => warn!("SSE mirror skipped {} engine commands", n),
                Err(RecvError::Closed) => break,
            }
        }
        debug!("Engine command stream closed");
    });
}

pub type SharedState = Arc<AppState>;
