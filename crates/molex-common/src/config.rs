//! Configuration loading for Molex.
//! Reads molex.toml from the current directory or the path in the MOLEX_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::MolexError;
use crate::protein::{ProteinCatalog, ProteinEntry, ProteinId};

/// Placeholder substituted with the upper-case accession code.
pub const PROTEIN_PLACEHOLDER: &str = "{protein}";
/// Placeholder substituted with the lower-case accession code.
pub const PROTEIN_LOWER_PLACEHOLDER: &str = "{protein_lower}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub structure: StructureConfig,
    #[serde(default)]
    pub proteins: ProteinsConfig,
}

// ── Server ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host()       -> String { "127.0.0.1".to_string() }
fn default_port()       -> u16    { 3001 }
fn default_static_dir() -> String { "crates/molex-web/static".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

// ── Assay data ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory or `http(s)://` base holding the per-protein CSV files.
    #[serde(default = "default_assay_base")]
    pub assay_base: String,
    #[serde(default = "default_assay_pattern")]
    pub assay_file_pattern: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_assay_base()    -> String { "data".to_string() }
fn default_assay_pattern() -> String { format!("assay_{PROTEIN_PLACEHOLDER}.csv") }
fn default_timeout()       -> u64    { 30 }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            assay_base: default_assay_base(),
            assay_file_pattern: default_assay_pattern(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl DataConfig {
    /// File name of the CSV resource for one protein.
    pub fn assay_file_name(&self, protein: &ProteinId) -> String {
        fill_template(&self.assay_file_pattern, protein)
    }

    pub fn is_remote(&self) -> bool {
        self.assay_base.starts_with("http://") || self.assay_base.starts_with("https://")
    }
}

// ── Structure ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    #[serde(default = "default_structure_url")]
    pub url_template: String,
    /// Format tag handed to the visualization engine.
    #[serde(default = "default_format")]
    pub format: String,
    /// Download cache; `None` uses the platform cache directory.
    #[serde(default)]
    pub cache_dir: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_structure_url() -> String {
    format!("https://files.rcsb.org/download/{PROTEIN_PLACEHOLDER}.pdb")
}
fn default_format() -> String { "pdb".to_string() }

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            url_template: default_structure_url(),
            format: default_format(),
            cache_dir: None,
            request_timeout_secs: default_timeout(),
        }
    }
}

// ── Protein catalog ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProteinsConfig {
    #[serde(default = "default_protein")]
    pub default: String,
    #[serde(default = "default_catalog")]
    pub catalog: Vec<CatalogEntryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntryConfig {
    pub id: String,
    pub name: String,
}

fn default_protein() -> String { "6LU7".to_string() }

fn default_catalog() -> Vec<CatalogEntryConfig> {
    ProteinCatalog::default()
        .entries()
        .iter()
        .map(|e| CatalogEntryConfig { id: e.id.to_string(), name: e.name.clone() })
        .collect()
}

impl Default for ProteinsConfig {
    fn default() -> Self {
        Self {
            default: default_protein(),
            catalog: default_catalog(),
        }
    }
}

// ── Helper Methods ─────────────────────────────────────────────────────────────

impl Config {
    /// Load configuration from molex.toml.
    /// Checks MOLEX_CONFIG env var first, then the current directory. A missing
    /// file is not an error; built-in defaults are used instead.
    pub fn load() -> Result<Self, MolexError> {
        let path = std::env::var("MOLEX_CONFIG").unwrap_or_else(|_| "molex.toml".to_string());
        Self::from_path(&path)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, MolexError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, MolexError> {
        toml::from_str(content).map_err(|e| MolexError::Config(e.to_string()))
    }

    /// Build the validated protein catalog.
    pub fn catalog(&self) -> Result<ProteinCatalog, MolexError> {
        let entries = self
            .proteins
            .catalog
            .iter()
            .map(|e| ProteinEntry::new(&e.id, &e.name))
            .collect::<Result<Vec<_>, _>>()?;
        let default = ProteinId::parse(&self.proteins.default)?;
        ProteinCatalog::new(entries, default)
    }

    /// URL of the structure file for one protein.
    pub fn structure_url(&self, protein: &ProteinId) -> String {
        fill_template(&self.structure.url_template, protein)
    }
}

/// Substitute the protein placeholders in a path or URL template.
pub fn fill_template(template: &str, protein: &ProteinId) -> String {
    template
        .replace(PROTEIN_LOWER_PLACEHOLDER, &protein.as_str().to_ascii_lowercase())
        .replace(PROTEIN_PLACEHOLDER, protein.as_str())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.data.assay_base, "data");
        assert_eq!(config.structure.format, "pdb");
        assert_eq!(config.proteins.default, "6LU7");
        assert_eq!(config.proteins.catalog.len(), 3);
    }

    #[test]
    fn test_assay_file_convention() {
        let config = Config::default();
        let id = ProteinId::parse("1hsg").unwrap();
        assert_eq!(config.data.assay_file_name(&id), "assay_1HSG.csv");
        assert!(!config.data.is_remote());
    }

    #[test]
    fn test_structure_url() {
        let config = Config::default();
        let id = ProteinId::parse("6LU7").unwrap();
        assert_eq!(config.structure_url(&id), "https://files.rcsb.org/download/6LU7.pdb");
    }

    #[test]
    fn test_lower_placeholder() {
        let id = ProteinId::parse("6LU7").unwrap();
        assert_eq!(fill_template("pdb{protein_lower}.ent", &id), "pdb6lu7.ent");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 8080

            [data]
            assay_base = "https://example.org/assays"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.data.is_remote());
        assert_eq!(config.data.assay_file_pattern, "assay_{protein}.csv");
    }

    #[test]
    fn test_custom_catalog() {
        let config = Config::from_toml_str(
            r#"
            [proteins]
            default = "1HSG"
            catalog = [{ id = "1HSG", name = "HIV-1 Protease" }]
            "#,
        )
        .unwrap();
        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.entries().len(), 1);
        assert_eq!(catalog.default_protein().as_str(), "1HSG");
    }

    #[test]
    fn test_bad_default_rejected() {
        let config = Config::from_toml_str(
            r#"
            [proteins]
            default = "9ZZZ"
            "#,
        )
        .unwrap();
        assert!(config.catalog().is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 4000").unwrap();
        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.server.port, 4000);

        let missing = Config::from_path("/definitely/not/here/molex.toml").unwrap();
        assert_eq!(missing.server.port, 3001);
    }
}
