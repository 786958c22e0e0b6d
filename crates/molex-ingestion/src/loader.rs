//! Dataset loader with loading/error state and a stale-response guard.
//!
//! Every load takes a generation ticket from [`DatasetLoader::begin`]. The
//! result is committed only if no newer ticket has been issued since, and the
//! check happens inside the same watch-channel update that commits, so a
//! slow response for an old protein can never overwrite a newer one.
//!
//! Tickets are issued synchronously so the caller decides which request is
//! newest, not the order in which spawned tasks happen to be polled.

use chrono::{DateTime, Utc};
use molex_common::{Dataset, MolexError, ProteinId};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::parse::parse_assay_csv;
use crate::source::AssaySource;

/// Snapshot of the loader, published on every transition.
#[derive(Debug, Clone, Default)]
pub struct LoadState {
    /// Protein of the most recent load request.
    pub protein: Option<ProteinId>,
    pub generation: u64,
    pub loading: bool,
    pub dataset: Arc<Dataset>,
    pub error: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// What happened to one `load` call.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied { rows: usize },
    /// A newer load started before this one finished; its result was dropped.
    Stale,
    Failed(String),
}

/// Claim on the next commit, issued by [`DatasetLoader::begin`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    protein: ProteinId,
    generation: u64,
}

impl LoadTicket {
    pub fn protein(&self) -> &ProteinId {
        &self.protein
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct DatasetLoader {
    source: Arc<dyn AssaySource>,
    state: watch::Sender<LoadState>,
}

impl DatasetLoader {
    pub fn new(source: Arc<dyn AssaySource>) -> Self {
        let (state, _) = watch::channel(LoadState::default());
        Self { source, state }
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    /// Start a load and publish the loading state. Any ticket issued
    /// earlier becomes stale.
    pub fn begin(&self, protein: &ProteinId) -> LoadTicket {
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            if s.protein.as_ref() != Some(protein) {
                s.dataset = Arc::new(Dataset::empty());
            }
            s.protein = Some(protein.clone());
            s.loading = true;
            s.error = None;
        });
        LoadTicket {
            protein: protein.clone(),
            generation,
        }
    }

    pub async fn load(&self, protein: &ProteinId) -> LoadOutcome {
        let ticket = self.begin(protein);
        self.finish(ticket).await
    }

    /// Fetch and parse for `ticket`, committing only if it is still the newest.
    pub async fn finish(&self, ticket: LoadTicket) -> LoadOutcome {
        let LoadTicket { protein, generation } = ticket;

        let location = self.source.location(&protein);
        info!("Loading assay data for {} from {}", protein, location);

        let result = match self.source.fetch(&protein).await {
            Ok(text) => parse_assay_csv(&text),
            Err(e) => Err(e),
        };

        let mut outcome = LoadOutcome::Stale;
        self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            s.loading = false;
            s.loaded_at = Some(Utc::now());
            match &result {
                Ok(dataset) => {
                    s.dataset = Arc::new(dataset.clone());
                    s.error = None;
                    outcome = LoadOutcome::Applied { rows: dataset.len() };
                }
                Err(e) => {
                    s.dataset = Arc::new(Dataset::empty());
                    s.error = Some(e.to_string());
                    outcome = LoadOutcome::Failed(e.to_string());
                }
            }
            true
        });

        match (&outcome, &result) {
            (LoadOutcome::Applied { rows }, _) => {
                info!("Loaded {} assay records for {}", rows, protein);
            }
            (LoadOutcome::Failed(_), Err(e)) => log_failure(&protein, e),
            _ => debug!("Discarding stale assay response for {} (ticket {})", protein, generation),
        }
        outcome
    }
}

fn log_failure(protein: &ProteinId, err: &MolexError) {
    error!("Error loading assay data for {}: {}", protein, err);
}
