//! molex-common: shared types, errors, and configuration used across all Molex crates.

pub mod error;
pub mod toxicity;
pub mod assay;
pub mod protein;
pub mod config;

// Re-export commonly used types
pub use assay::{format_one_decimal, AssayRecord, Dataset};
pub use config::Config;
pub use error::{ApiError, MolexError};
pub use protein::{ProteinCatalog, ProteinEntry, ProteinId};
pub use toxicity::{color_for, Rgb, Toxicity, ToxicityColor};
