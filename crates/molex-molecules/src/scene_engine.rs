//! In-process structure engine.
//!
//! Downloads and parses structures itself, keeps per-scene colour/overlay
//! state and the camera target, and broadcasts each [`EngineCommand`] so a
//! browser-side Mol* instance can mirror the scene.

use async_trait::async_trait;
use molex_common::Rgb;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::engine::{
    BoundingSphere, EngineCommand, EngineError, Overlay, SceneHandle, StructureEngine, StructureFormat,
};
use crate::pdb::StructureFetcher;
use crate::structure::{Structure, StructureSummary};

struct Scene {
    url: String,
    format: StructureFormat,
    structure: Structure,
    color: Option<Rgb>,
    overlays: BTreeSet<Overlay>,
}

#[derive(Default)]
struct EngineInner {
    initialized: bool,
    disposed: bool,
    scenes: HashMap<SceneHandle, Scene>,
    shown: Option<SceneHandle>,
    camera: Option<BoundingSphere>,
}

/// Read-only view of the engine for status pages and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub initialized: bool,
    pub disposed: bool,
    pub live_scenes: usize,
    pub shown: Option<SceneHandle>,
    pub camera: Option<BoundingSphere>,
}

/// Colour and overlays applied to one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    pub url: String,
    pub atoms: usize,
    pub color: Option<Rgb>,
    pub overlays: Vec<Overlay>,
}

pub struct SceneEngine {
    fetcher: StructureFetcher,
    inner: Mutex<EngineInner>,
    commands: broadcast::Sender<EngineCommand>,
}

impl SceneEngine {
    pub fn new(fetcher: StructureFetcher) -> Self {
        let (commands, _) = broadcast::channel(256);
        Self {
            fetcher,
            inner: Mutex::new(EngineInner::default()),
            commands,
        }
    }

    /// Subscribe to the command stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineCommand> {
        self.commands.subscribe()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let inner = self.lock();
        EngineSnapshot {
            initialized: inner.initialized,
            disposed: inner.disposed,
            live_scenes: inner.scenes.len(),
            shown: inner.shown,
            camera: inner.camera,
        }
    }

    pub fn scene(&self, scene: &SceneHandle) -> Option<SceneSnapshot> {
        let inner = self.lock();
        inner.scenes.get(scene).map(|s| SceneSnapshot {
            url: s.url.clone(),
            atoms: s.structure.atom_count(),
            color: s.color,
            overlays: s.overlays.iter().copied().collect(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ready(&self) -> Result<MutexGuard<'_, EngineInner>, EngineError> {
        let inner = self.lock();
        if inner.disposed {
            return Err(EngineError::Disposed);
        }
        if !inner.initialized {
            return Err(EngineError::NotInitialized);
        }
        Ok(inner)
    }

    fn emit(&self, command: EngineCommand) {
        // No subscribers is fine: nobody is mirroring the scene.
        let _ = self.commands.send(command);
    }
}

#[async_trait]
impl StructureEngine for SceneEngine {
    async fn init(&self) -> Result<(), EngineError> {
        if self.lock().disposed {
            return Err(EngineError::Disposed);
        }
        self.fetcher
            .prepare()
            .await
            .map_err(|e| EngineError::Fetch(format!("{e:#}")))?;
        self.lock().initialized = true;
        info!("Structure engine initialized (cache {:?})", self.fetcher.cache_dir());
        self.emit(EngineCommand::Initialized);
        Ok(())
    }

    async fn load_structure(&self, url: &str, format: StructureFormat) -> Result<SceneHandle, EngineError> {
        drop(self.ready()?);

        let text = self
            .fetcher
            .fetch_text(url)
            .await
            .map_err(|e| EngineError::Fetch(format!("{e:#}")))?;
        let structure = tokio::task::spawn_blocking(move || Structure::parse(&text, format))
            .await
            .map_err(|e| EngineError::Parse(e.to_string()))??;

        let summary = structure.summary();
        let handle = SceneHandle::new();
        {
            let mut inner = self.ready()?;
            inner.scenes.insert(
                handle,
                Scene {
                    url: url.to_string(),
                    format,
                    structure,
                    color: None,
                    overlays: BTreeSet::new(),
                },
            );
        }
        info!("Loaded scene {} from {} ({} atoms)", handle, url, summary.atoms);
        self.emit(EngineCommand::StructureLoaded {
            scene: handle,
            url: url.to_string(),
            format,
            summary,
        });
        Ok(handle)
    }

    async fn present(&self, scene: &SceneHandle) -> Result<(), EngineError> {
        let (url, format) = {
            let mut inner = self.ready()?;
            let entry = inner.scenes.get(scene).ok_or(EngineError::UnknownScene(*scene))?;
            let shown = (entry.url.clone(), entry.format);
            inner.shown = Some(*scene);
            shown
        };
        debug!("Showing scene {}", scene);
        self.emit(EngineCommand::StructureShown { scene: *scene, url, format });
        Ok(())
    }

    async fn clear(&self, scene: &SceneHandle) -> Result<(), EngineError> {
        {
            let mut inner = self.ready()?;
            if inner.scenes.remove(scene).is_none() {
                return Err(EngineError::UnknownScene(*scene));
            }
            if inner.shown == Some(*scene) {
                inner.shown = None;
            }
        }
        debug!("Cleared scene {}", scene);
        self.emit(EngineCommand::StructureCleared { scene: *scene });
        Ok(())
    }

    async fn recolor(&self, scene: &SceneHandle, color: Rgb) -> Result<(), EngineError> {
        {
            let mut inner = self.ready()?;
            let entry = inner
                .scenes
                .get_mut(scene)
                .ok_or(EngineError::UnknownScene(*scene))?;
            entry.color = Some(color);
        }
        self.emit(EngineCommand::Recolored {
            scene: *scene,
            color,
            css: color.to_css(),
        });
        Ok(())
    }

    fn bounding_sphere(&self, scene: &SceneHandle) -> Option<BoundingSphere> {
        let inner = self.lock();
        inner.scenes.get(scene)?.structure.bounding_sphere()
    }

    fn summary(&self, scene: &SceneHandle) -> Option<StructureSummary> {
        self.lock().scenes.get(scene).map(|s| s.structure.summary())
    }

    async fn focus(&self, sphere: &BoundingSphere) -> Result<(), EngineError> {
        self.ready()?.camera = Some(*sphere);
        self.emit(EngineCommand::Focused { sphere: *sphere });
        Ok(())
    }

    async fn set_overlay(&self, scene: &SceneHandle, overlay: Overlay, enabled: bool) -> Result<(), EngineError> {
        let changed = {
            let mut inner = self.ready()?;
            let entry = inner
                .scenes
                .get_mut(scene)
                .ok_or(EngineError::UnknownScene(*scene))?;
            if enabled {
                entry.overlays.insert(overlay)
            } else {
                entry.overlays.remove(&overlay)
            }
        };
        if changed {
            self.emit(EngineCommand::OverlayChanged { scene: *scene, overlay, enabled });
        }
        Ok(())
    }

    fn dispose(&self) {
        let released = {
            let mut inner = self.lock();
            if inner.disposed {
                return;
            }
            inner.disposed = true;
            inner.shown = None;
            inner.camera = None;
            let n = inner.scenes.len();
            inner.scenes.clear();
            n
        };
        info!("Structure engine disposed ({} scenes released)", released);
        self.emit(EngineCommand::Disposed);
    }
}
