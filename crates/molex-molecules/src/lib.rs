//! Molex Molecules - 3-D structure side of the dashboard.
//!
//! This crate handles:
//! 1. Fetching protein structures (RCSB PDB) with an on-disk cache
//! 2. Parsing them into component groups with a bounding sphere
//! 3. The visualization-engine seam ([`engine::StructureEngine`]) and an
//!    in-process implementation that mirrors its commands to browsers
//! 4. The structure viewer adapter that owns the engine lifecycle

pub mod pdb;
pub mod structure;
pub mod engine;
pub mod scene_engine;
pub mod viewer;

pub use engine::{BoundingSphere, EngineCommand, EngineError, Overlay, SceneHandle, StructureEngine, StructureFormat};
pub use scene_engine::SceneEngine;
pub use viewer::{ReloadOutcome, ReloadTicket, StructureUrls, StructureViewer, ViewerControl, ViewerPhase, ViewerStatus};

pub type Result<T> = anyhow::Result<T>;
