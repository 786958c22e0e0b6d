//! Structure viewer adapter.
//!
//! Owns the single engine instance for the lifetime of one mounted viewer:
//!
//! ```text
//! mount ──► Ready ──reload──► Loading ──ok──► Loaded ──reload──► Loading ...
//!                               │ err                │ recolor / focus / overlay
//!                               ▼                    ▼ (in place)
//!                             Ready               Loaded
//! any ──dispose / drop──► Disposed
//! ```
//!
//! The parent only ever sees [`ViewerControl`]. Engine failures are logged
//! here and never reach the caller.
//!
//! A reload is split in two: [`ViewerControl::begin_reload`] takes the
//! generation ticket synchronously, [`ViewerControl::complete_reload`] does the
//! engine work and commits only if the ticket is still the newest. Colour and
//! overlay commands are serialized with the commit so a recolor issued while a
//! load is being finished is never overwritten by the remembered colour.

use async_trait::async_trait;
use molex_common::config::fill_template;
use molex_common::{color_for, ProteinId, Rgb, Toxicity};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

use crate::engine::{BoundingSphere, EngineError, Overlay, SceneHandle, StructureEngine, StructureFormat};
use crate::structure::StructureSummary;

/// Claim on the next structure commit, issued by
/// [`ViewerControl::begin_reload`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadTicket {
    pub protein: ProteinId,
    pub generation: u64,
    /// Scene that was on screen when the reload began; cleared first.
    pub previous: Option<SceneHandle>,
}

/// Narrow capability handed to the page orchestrator.
#[async_trait]
pub trait ViewerControl: Send + Sync {
    /// Mark `protein` as the structure to show, superseding every earlier
    /// reload. `None` once disposed.
    fn begin_reload(&self, protein: &ProteinId) -> Option<ReloadTicket>;

    /// Clear the previous structure and load the ticket's one.
    async fn complete_reload(&self, ticket: ReloadTicket) -> ReloadOutcome;

    /// Clear the current structure and load the one for `protein`.
    async fn reload_structure(&self, protein: &ProteinId) -> ReloadOutcome {
        match self.begin_reload(protein) {
            Some(ticket) => self.complete_reload(ticket).await,
            None => ReloadOutcome::Disposed,
        }
    }

    /// Recolor the loaded structure; remembered for the next load.
    async fn recolor(&self, toxicity: &Toxicity);

    /// Frame the loaded structure. Silent no-op without one.
    async fn focus_compound(&self, compound_id: &str);

    async fn set_overlay(&self, overlay: Overlay, enabled: bool);

    fn status(&self) -> ViewerStatus;

    async fn dispose(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReloadOutcome {
    Loaded(SceneHandle),
    /// Superseded by a newer reload before finishing; the scene was cleared.
    Stale,
    Failed(String),
    Disposed,
}

/// Builds structure URLs from the configured template.
#[derive(Debug, Clone)]
pub struct StructureUrls {
    template: String,
    format: StructureFormat,
}

impl StructureUrls {
    pub fn new(template: impl Into<String>, format: StructureFormat) -> Self {
        Self {
            template: template.into(),
            format,
        }
    }

    pub fn url_for(&self, protein: &ProteinId) -> String {
        fill_template(&self.template, protein)
    }

    pub fn format(&self) -> StructureFormat {
        self.format
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerPhase {
    Ready,
    Loading,
    Loaded,
    Disposed,
}

/// Snapshot served to late-joining browsers so they can rebuild the scene.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerStatus {
    pub phase: ViewerPhase,
    pub protein: Option<ProteinId>,
    /// Scene on screen, present only once a load has committed.
    pub scene: Option<SceneHandle>,
    pub structure_url: Option<String>,
    pub format: StructureFormat,
    pub toxicity: Toxicity,
    pub color: Rgb,
    pub overlays: Vec<Overlay>,
    /// Last camera target issued for the current structure.
    pub camera: Option<BoundingSphere>,
    pub summary: Option<StructureSummary>,
}

enum Phase {
    Ready,
    Loading { protein: ProteinId },
    Loaded { protein: ProteinId, scene: SceneHandle },
    Disposed,
}

struct ViewerInner {
    phase: Phase,
    generation: u64,
    toxicity: Toxicity,
    overlays: BTreeSet<Overlay>,
    camera: Option<BoundingSphere>,
}

impl ViewerInner {
    fn loaded_scene(&self) -> Option<SceneHandle> {
        match &self.phase {
            Phase::Loaded { scene, .. } => Some(*scene),
            _ => None,
        }
    }
}

pub struct StructureViewer {
    engine: Arc<dyn StructureEngine>,
    urls: StructureUrls,
    inner: Mutex<ViewerInner>,
    /// Held while colour or overlays are pushed to the engine.
    paint: AsyncMutex<()>,
}

impl StructureViewer {
    /// Initialise the engine and mount the viewer. The engine is initialised
    /// exactly once here; on failure it is disposed before returning.
    pub async fn mount(engine: Arc<dyn StructureEngine>, urls: StructureUrls) -> Result<Self, EngineError> {
        if let Err(e) = engine.init().await {
            error!("Structure engine failed to initialize: {}", e);
            engine.dispose();
            return Err(e);
        }
        info!("Structure viewer mounted");
        Ok(Self {
            engine,
            urls,
            inner: Mutex::new(ViewerInner {
                phase: Phase::Ready,
                generation: 0,
                toxicity: Toxicity::default(),
                overlays: BTreeSet::new(),
                camera: None,
            }),
            paint: AsyncMutex::new(()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ViewerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn clear_logged(&self, scene: &SceneHandle) {
        if let Err(e) = self.engine.clear(scene).await {
            warn!("Failed to clear scene {}: {}", scene, e);
        }
    }

    async fn apply_color(&self, scene: &SceneHandle, toxicity: &Toxicity) {
        let color = color_for(toxicity).rgb;
        if let Err(e) = self.engine.recolor(scene, color).await {
            warn!("Recolor to {} failed: {}", toxicity, e);
        }
    }

    async fn apply_overlay(&self, scene: &SceneHandle, overlay: Overlay, enabled: bool) {
        if let Err(e) = self.engine.set_overlay(scene, overlay, enabled).await {
            warn!("Overlay {} ({}) failed: {}", overlay.label(), enabled, e);
        }
    }
}

#[async_trait]
impl ViewerControl for StructureViewer {
    fn begin_reload(&self, protein: &ProteinId) -> Option<ReloadTicket> {
        let mut inner = self.lock();
        if matches!(inner.phase, Phase::Disposed) {
            return None;
        }
        inner.generation += 1;
        let previous = inner.loaded_scene();
        inner.phase = Phase::Loading { protein: protein.clone() };
        inner.camera = None;
        Some(ReloadTicket {
            protein: protein.clone(),
            generation: inner.generation,
            previous,
        })
    }

    async fn complete_reload(&self, ticket: ReloadTicket) -> ReloadOutcome {
        let ReloadTicket { protein, generation, previous } = ticket;
        if let Some(previous) = previous {
            self.clear_logged(&previous).await;
        }

        let url = self.urls.url_for(&protein);
        info!("Loading structure {} from {}", protein, url);
        let scene = match self.engine.load_structure(&url, self.urls.format()).await {
            Ok(scene) => scene,
            Err(e) => {
                error!("Error loading structure {}: {}", protein, e);
                let mut inner = self.lock();
                if inner.generation == generation && !matches!(inner.phase, Phase::Disposed) {
                    inner.phase = Phase::Ready;
                }
                return ReloadOutcome::Failed(e.to_string());
            }
        };

        let _paint = self.paint.lock().await;
        let committed = {
            let mut inner = self.lock();
            if inner.generation == generation && !matches!(inner.phase, Phase::Disposed) {
                inner.phase = Phase::Loaded { protein: protein.clone(), scene };
                Some((inner.toxicity.clone(), inner.overlays.clone()))
            } else {
                None
            }
        };

        match committed {
            Some((toxicity, overlays)) => {
                if let Err(e) = self.engine.present(&scene).await {
                    warn!("Failed to show scene {}: {}", scene, e);
                }
                self.apply_color(&scene, &toxicity).await;
                for overlay in overlays {
                    self.apply_overlay(&scene, overlay, true).await;
                }
                ReloadOutcome::Loaded(scene)
            }
            None => {
                debug!("Discarding stale structure for {}", protein);
                self.clear_logged(&scene).await;
                ReloadOutcome::Stale
            }
        }
    }

    async fn recolor(&self, toxicity: &Toxicity) {
        let _paint = self.paint.lock().await;
        let scene = {
            let mut inner = self.lock();
            inner.toxicity = toxicity.clone();
            inner.loaded_scene()
        };
        match scene {
            Some(scene) => self.apply_color(&scene, toxicity).await,
            None => debug!("Recolor to {} deferred until a structure is loaded", toxicity),
        }
    }

    async fn focus_compound(&self, compound_id: &str) {
        let Some(scene) = self.lock().loaded_scene() else {
            debug!("Focus on {} ignored: no structure loaded", compound_id);
            return;
        };
        let Some(sphere) = self.engine.bounding_sphere(&scene) else {
            debug!("Focus on {} ignored: no bounds for scene {}", compound_id, scene);
            return;
        };
        debug!("Focusing structure for compound {} (radius {:.1})", compound_id, sphere.radius);
        match self.engine.focus(&sphere).await {
            Ok(()) => {
                let mut inner = self.lock();
                if inner.loaded_scene() == Some(scene) {
                    inner.camera = Some(sphere);
                }
            }
            Err(e) => warn!("Focus for {} failed: {}", compound_id, e),
        }
    }

    async fn set_overlay(&self, overlay: Overlay, enabled: bool) {
        let _paint = self.paint.lock().await;
        let scene = {
            let mut inner = self.lock();
            if enabled {
                inner.overlays.insert(overlay);
            } else {
                inner.overlays.remove(&overlay);
            }
            inner.loaded_scene()
        };
        if let Some(scene) = scene {
            self.apply_overlay(&scene, overlay, enabled).await;
        }
    }

    fn status(&self) -> ViewerStatus {
        let inner = self.lock();
        let scene = inner.loaded_scene();
        let summary = scene.and_then(|scene| self.engine.summary(&scene));
        let (phase, protein) = match &inner.phase {
            Phase::Ready => (ViewerPhase::Ready, None),
            Phase::Loading { protein } => (ViewerPhase::Loading, Some(protein.clone())),
            Phase::Loaded { protein, .. } => (ViewerPhase::Loaded, Some(protein.clone())),
            Phase::Disposed => (ViewerPhase::Disposed, None),
        };
        ViewerStatus {
            phase,
            structure_url: protein.as_ref().map(|p| self.urls.url_for(p)),
            protein,
            scene,
            format: self.urls.format(),
            color: color_for(&inner.toxicity).rgb,
            toxicity: inner.toxicity.clone(),
            overlays: inner.overlays.iter().copied().collect(),
            camera: inner.camera,
            summary,
        }
    }

    async fn dispose(&self) {
        let scene = {
            let mut inner = self.lock();
            if matches!(inner.phase, Phase::Disposed) {
                return;
            }
            let scene = inner.loaded_scene();
            inner.phase = Phase::Disposed;
            scene
        };
        if let Some(scene) = scene {
            self.clear_logged(&scene).await;
        }
        self.engine.dispose();
        info!("Structure viewer disposed");
    }
}

impl Drop for StructureViewer {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !matches!(inner.phase, Phase::Disposed) {
            inner.phase = Phase::Disposed;
            self.engine.dispose();
        }
    }
}
