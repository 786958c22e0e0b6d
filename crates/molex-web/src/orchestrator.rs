//! Page orchestrator: owns the selection and wires the loader, the viewer
//! and the views together.
//!
//! Reload tickets for the dataset and the structure are taken while the
//! selection lock is held, so the last protein selected is always the one
//! both reloads commit, whatever order the spawned tasks run in.

use molex_common::{color_for, AssayRecord, Dataset, MolexError, ProteinCatalog, ProteinId, Toxicity};
use molex_ingestion::{DatasetLoader, LoadOutcome, LoadState, LoadTicket};
use molex_molecules::{Overlay, ReloadOutcome, ReloadTicket, ViewerControl, ViewerStatus};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::state::AppEvent;

/// Process-wide UI state. Views get it by reference; changes go through
/// [`Dashboard`] methods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub protein: ProteinId,
    pub toxicity: Toxicity,
    /// Last activated row, highlighted in the table.
    pub focused_compound: Option<String>,
}

impl Selection {
    pub fn new(protein: ProteinId) -> Self {
        Self {
            protein,
            toxicity: Toxicity::default(),
            focused_compound: None,
        }
    }
}

/// The two independent reloads started by a protein change.
pub struct ReloadTasks {
    pub dataset: JoinHandle<LoadOutcome>,
    pub structure: JoinHandle<ReloadOutcome>,
}

impl ReloadTasks {
    /// Wait for both reloads. A panicked task is reported as `None`.
    pub async fn join(self) -> (Option<LoadOutcome>, Option<ReloadOutcome>) {
        let (dataset, structure) = tokio::join!(self.dataset, self.structure);
        (dataset.ok(), structure.ok())
    }
}

pub struct Dashboard {
    catalog: ProteinCatalog,
    selection: Mutex<Selection>,
    loader: Arc<DatasetLoader>,
    viewer: Arc<dyn ViewerControl>,
    events: broadcast::Sender<AppEvent>,
}

impl Dashboard {
    pub fn new(
        catalog: ProteinCatalog,
        loader: Arc<DatasetLoader>,
        viewer: Arc<dyn ViewerControl>,
        events: broadcast::Sender<AppEvent>,
    ) -> Self {
        let selection = Selection::new(catalog.default_protein().clone());
        Self {
            catalog,
            selection: Mutex::new(selection),
            loader,
            viewer,
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: AppEvent) {
        let _ = self.events.send(event);
    }

    pub fn catalog(&self) -> &ProteinCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> Selection {
        self.lock().clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.loader.state()
    }

    pub fn dataset(&self) -> Arc<Dataset> {
        self.loader.state().dataset
    }

    pub fn viewer_status(&self) -> ViewerStatus {
        self.viewer.status()
    }

    /// Initial load of the selected (default) protein.
    pub fn mount(&self) -> ReloadTasks {
        let tickets = {
            let selection = self.lock();
            info!("Mounting dashboard with {}", selection.protein);
            self.begin_reloads(&selection.protein)
        };
        self.spawn_reloads(tickets)
    }

    /// Switch to another catalog protein and reload dataset and structure.
    pub fn select_protein(&self, raw: &str) -> Result<ReloadTasks, MolexError> {
        let protein = self.catalog.resolve(raw)?;
        let (toxicity, tickets) = {
            let mut selection = self.lock();
            selection.protein = protein.clone();
            selection.focused_compound = None;
            (selection.toxicity.clone(), self.begin_reloads(&protein))
        };
        info!("Selected protein {}", protein);
        self.emit(AppEvent::SelectionChanged { protein, toxicity });
        Ok(self.spawn_reloads(tickets))
    }

    /// Caller holds the selection lock.
    fn begin_reloads(&self, protein: &ProteinId) -> (LoadTicket, Option<ReloadTicket>) {
        (self.loader.begin(protein), self.viewer.begin_reload(protein))
    }

    fn spawn_reloads(&self, (load, reload): (LoadTicket, Option<ReloadTicket>)) -> ReloadTasks {
        let dataset = {
            let loader = self.loader.clone();
            let events = self.events.clone();
            tokio::spawn(async move {
                let protein = load.protein().clone();
                let outcome = loader.finish(load).await;
                let event = match &outcome {
                    LoadOutcome::Applied { rows } => Some(AppEvent::DatasetLoaded {
                        protein,
                        rows: *rows,
                    }),
                    LoadOutcome::Failed(error) => Some(AppEvent::DatasetFailed {
                        protein,
                        error: error.clone(),
                    }),
                    LoadOutcome::Stale => None,
                };
                if let Some(event) = event {
                    let _ = events.send(event);
                }
                outcome
            })
        };

        let structure = {
            let viewer = self.viewer.clone();
            let events = self.events.clone();
            tokio::spawn(async move {
                let Some(ticket) = reload else {
                    return ReloadOutcome::Disposed;
                };
                let protein = ticket.protein.clone();
                let outcome = viewer.complete_reload(ticket).await;
                if let ReloadOutcome::Failed(reason) = &outcome {
                    let _ = events.send(AppEvent::Notification {
                        level: "error".to_string(),
                        message: format!("Could not load structure {}: {}", protein, reason),
                    });
                }
                outcome
            })
        };

        ReloadTasks { dataset, structure }
    }

    /// Row activation: recolor by the row's toxicity and focus the camera.
    pub async fn activate_row(&self, record: &AssayRecord) {
        {
            let mut selection = self.lock();
            selection.toxicity = record.toxicity.clone();
            selection.focused_compound = Some(record.compound_id.clone());
        }
        debug!("Activated {} ({})", record.compound_id, record.toxicity);
        self.emit(AppEvent::CompoundFocused {
            compound_id: record.compound_id.clone(),
            toxicity: record.toxicity.clone(),
            color: color_for(&record.toxicity).css.to_string(),
        });

        tokio::join!(
            self.viewer.recolor(&record.toxicity),
            self.viewer.focus_compound(&record.compound_id),
        );
    }

    /// Activate a row of the current dataset by compound id.
    pub async fn activate_compound(&self, compound_id: &str) -> Result<AssayRecord, MolexError> {
        let dataset = self.dataset();
        let record = dataset
            .find(compound_id)
            .cloned()
            .ok_or_else(|| MolexError::CompoundNotFound(compound_id.to_string()))?;
        self.activate_row(&record).await;
        Ok(record)
    }

    pub async fn set_overlay(&self, overlay: Overlay, enabled: bool) {
        info!("{} overlay {}", overlay.label(), if enabled { "on" } else { "off" });
        self.viewer.set_overlay(overlay, enabled).await;
    }

    pub async fn unmount(&self) {
        info!("Unmounting dashboard");
        self.viewer.dispose().await;
    }
}
