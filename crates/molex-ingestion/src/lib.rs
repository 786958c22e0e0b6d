//! Molex Ingestion - assay dataset loading.
//!
//! 1. Locating the per-protein CSV resource (local directory or HTTP base)
//! 2. Parsing it into typed [`AssayRecord`](molex_common::AssayRecord)s
//! 3. Publishing loading / error / dataset state with a stale-response guard

pub mod parse;
pub mod source;
pub mod loader;

pub use loader::{DatasetLoader, LoadOutcome, LoadState, LoadTicket};
pub use parse::parse_assay_csv;
pub use source::{source_from_config, AssaySource, FileAssaySource, HttpAssaySource};
