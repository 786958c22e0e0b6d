//! The visualization-engine seam.
//!
//! The engine renders structures; callers only hand it a structure URL and a
//! format tag and get back an opaque [`SceneHandle`]. Everything else
//! (recolor, camera focus, overlays) is addressed through that handle.

use async_trait::async_trait;
use molex_common::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::structure::StructureSummary;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine has been disposed")]
    Disposed,

    #[error("Engine not initialized")]
    NotInitialized,

    #[error("Unknown scene {0}")]
    UnknownScene(SceneHandle),

    #[error("Structure fetch failed: {0}")]
    Fetch(String),

    #[error("Structure parse failed: {0}")]
    Parse(String),

    #[error("Unsupported structure format: {0}")]
    UnsupportedFormat(String),
}

/// Opaque reference to a structure loaded inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneHandle(Uuid);

impl SceneHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SceneHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SceneHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureFormat {
    Pdb,
    Mmcif,
}

impl StructureFormat {
    pub fn from_tag(tag: &str) -> Result<Self, EngineError> {
        match tag.to_ascii_lowercase().as_str() {
            "pdb" => Ok(Self::Pdb),
            "mmcif" | "cif" => Ok(Self::Mmcif),
            other => Err(EngineError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Pdb => "pdb",
            Self::Mmcif => "mmcif",
        }
    }
}

/// Optional representations layered on top of the default preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overlay {
    /// Molecular surface around the binding pocket.
    Surface,
    /// Hydrogen-bond interactions.
    HBonds,
}

impl Overlay {
    pub const ALL: [Overlay; 2] = [Overlay::Surface, Overlay::HBonds];

    pub fn label(self) -> &'static str {
        match self {
            Overlay::Surface => "Pocket Surface",
            Overlay::HBonds => "H-Bonds",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Overlay::Surface => "surface",
            Overlay::HBonds => "hbonds",
        }
    }
}

/// Camera target in structure coordinates (Ångström).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: [f64; 3],
    pub radius: f64,
}

/// Every state change an engine performs, broadcast so that a browser-side
/// renderer can replay it.
///
/// A loaded scene is not on screen until `StructureShown` names it. Commands
/// carrying a `scene` only apply to the scene currently shown.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineCommand {
    Initialized,
    StructureLoaded {
        scene: SceneHandle,
        url: String,
        format: StructureFormat,
        summary: StructureSummary,
    },
    StructureShown {
        scene: SceneHandle,
        url: String,
        format: StructureFormat,
    },
    StructureCleared { scene: SceneHandle },
    Recolored { scene: SceneHandle, color: Rgb, css: String },
    Focused { sphere: BoundingSphere },
    OverlayChanged { scene: SceneHandle, overlay: Overlay, enabled: bool },
    Disposed,
}

#[async_trait]
pub trait StructureEngine: Send + Sync {
    /// One-time initialisation; called exactly once per engine by the viewer.
    async fn init(&self) -> Result<(), EngineError>;

    /// Download `url`, parse it, and build the default preset.
    async fn load_structure(&self, url: &str, format: StructureFormat) -> Result<SceneHandle, EngineError>;

    /// Make a loaded scene the one on screen.
    async fn present(&self, scene: &SceneHandle) -> Result<(), EngineError>;

    /// Remove a scene and release what it holds.
    async fn clear(&self, scene: &SceneHandle) -> Result<(), EngineError>;

    /// Uniformly recolor every visual component of the scene.
    async fn recolor(&self, scene: &SceneHandle, color: Rgb) -> Result<(), EngineError>;

    fn bounding_sphere(&self, scene: &SceneHandle) -> Option<BoundingSphere>;

    /// Atom and component counts for a loaded scene.
    fn summary(&self, scene: &SceneHandle) -> Option<StructureSummary>;

    async fn focus(&self, sphere: &BoundingSphere) -> Result<(), EngineError>;

    /// Add (`enabled`) or delete an overlay representation.
    async fn set_overlay(&self, scene: &SceneHandle, overlay: Overlay, enabled: bool) -> Result<(), EngineError>;

    /// Release every engine resource. Must be idempotent.
    fn dispose(&self);
}
