//! Structure identifiers and the closed catalog offered by the protein selector.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MolexError;

/// A PDB accession code, normalised to upper case (e.g. `6LU7`).
///
/// Only 4-character alphanumeric codes are accepted, which also keeps the
/// identifier safe to splice into resource paths and URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProteinId(String);

impl ProteinId {
    pub fn parse(raw: &str) -> Result<Self, MolexError> {
        let trimmed = raw.trim();
        let valid = trimmed.len() == 4
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric())
            && trimmed.chars().next().is_some_and(|c| c.is_ascii_digit());
        if !valid {
            return Err(MolexError::InvalidProtein(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProteinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProteinId {
    type Error = MolexError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        ProteinId::parse(&raw)
    }
}

impl From<ProteinId> for String {
    fn from(id: ProteinId) -> Self {
        id.0
    }
}

/// One selectable protein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinEntry {
    pub id: ProteinId,
    /// Target name shown next to the accession code.
    pub name: String,
}

impl ProteinEntry {
    pub fn new(id: &str, name: &str) -> Result<Self, MolexError> {
        Ok(Self {
            id: ProteinId::parse(id)?,
            name: name.to_string(),
        })
    }

    /// Selector label, e.g. `6LU7 — SARS-CoV-2 Main Protease`.
    pub fn label(&self) -> String {
        format!("{} — {}", self.id, self.name)
    }
}

/// Closed list of supported proteins plus the startup selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProteinCatalog {
    entries: Vec<ProteinEntry>,
    default: ProteinId,
}

impl ProteinCatalog {
    pub fn new(entries: Vec<ProteinEntry>, default: ProteinId) -> Result<Self, MolexError> {
        if entries.is_empty() {
            return Err(MolexError::Config("protein catalog is empty".into()));
        }
        if !entries.iter().any(|e| e.id == default) {
            return Err(MolexError::Config(format!(
                "default protein {default} is not in the catalog"
            )));
        }
        Ok(Self { entries, default })
    }

    pub fn entries(&self) -> &[ProteinEntry] {
        &self.entries
    }

    pub fn default_protein(&self) -> &ProteinId {
        &self.default
    }

    pub fn get(&self, id: &ProteinId) -> Option<&ProteinEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Parse and check membership in one step.
    pub fn resolve(&self, raw: &str) -> Result<ProteinId, MolexError> {
        let id = ProteinId::parse(raw)?;
        if self.get(&id).is_none() {
            return Err(MolexError::UnknownProtein(id.to_string()));
        }
        Ok(id)
    }
}

impl Default for ProteinCatalog {
    fn default() -> Self {
        let entries = vec![
            ProteinEntry {
                id: ProteinId("6LU7".into()),
                name: "SARS-CoV-2 Main Protease".into(),
            },
            ProteinEntry {
                id: ProteinId("1HSG".into()),
                name: "HIV-1 Protease".into(),
            },
            ProteinEntry {
                id: ProteinId("1M17".into()),
                name: "EGFR Kinase Domain".into(),
            },
        ];
        Self {
            default: entries[0].id.clone(),
            entries,
        }
    }
}
