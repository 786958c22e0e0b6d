//! Where assay CSV text comes from.

use async_trait::async_trait;
use molex_common::config::{fill_template, DataConfig};
use molex_common::{MolexError, ProteinId};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Fetches the raw CSV text for one protein.
#[async_trait]
pub trait AssaySource: Send + Sync {
    async fn fetch(&self, protein: &ProteinId) -> Result<String, MolexError>;

    /// Human-readable location of the resource, for logs.
    fn location(&self, protein: &ProteinId) -> String;
}

/// Reads `{dir}/{pattern}` from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileAssaySource {
    dir: PathBuf,
    pattern: String,
}

impl FileAssaySource {
    pub fn new(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    fn path_for(&self, protein: &ProteinId) -> PathBuf {
        self.dir.join(fill_template(&self.pattern, protein))
    }
}

#[async_trait]
impl AssaySource for FileAssaySource {
    async fn fetch(&self, protein: &ProteinId) -> Result<String, MolexError> {
        let path = self.path_for(protein);
        debug!("Reading assay CSV {:?}", path);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| MolexError::Fetch(format!("{}: {}", path.display(), e)))
    }

    fn location(&self, protein: &ProteinId) -> String {
        self.path_for(protein).display().to_string()
    }
}

/// Downloads `{base_url}/{pattern}` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAssaySource {
    client: reqwest::Client,
    base_url: String,
    pattern: String,
}

impl HttpAssaySource {
    pub fn new(base_url: &str, pattern: &str, timeout: Duration) -> Result<Self, MolexError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MolexError::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            pattern: pattern.to_string(),
        })
    }

    fn url_for(&self, protein: &ProteinId) -> String {
        format!("{}/{}", self.base_url, fill_template(&self.pattern, protein))
    }
}

#[async_trait]
impl AssaySource for HttpAssaySource {
    async fn fetch(&self, protein: &ProteinId) -> Result<String, MolexError> {
        let url = self.url_for(protein);
        debug!("Downloading assay CSV {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| MolexError::Fetch(format!("{}: {}", url, e)))?;
        response
            .text()
            .await
            .map_err(|e| MolexError::Fetch(format!("{}: {}", url, e)))
    }

    fn location(&self, protein: &ProteinId) -> String {
        self.url_for(protein)
    }
}

/// Pick the source implementation for the configured base.
pub fn source_from_config(config: &DataConfig) -> Result<Arc<dyn AssaySource>, MolexError> {
    if config.is_remote() {
        let source = HttpAssaySource::new(
            &config.assay_base,
            &config.assay_file_pattern,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Arc::new(source))
    } else {
        Ok(Arc::new(FileAssaySource::new(
            &config.assay_base,
            config.assay_file_pattern.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_source_reads_per_protein_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("assay_1HSG.csv"), "Compound ID,IC50 (nM),Toxicity\n").unwrap();

        let source = FileAssaySource::new(dir.path(), "assay_{protein}.csv");
        let id = ProteinId::parse("1hsg").unwrap();
        let text = source.fetch(&id).await.unwrap();
        assert!(text.starts_with("Compound ID"));
        assert!(source.location(&id).ends_with("assay_1HSG.csv"));
    }

    #[tokio::test]
    async fn test_file_source_missing_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileAssaySource::new(dir.path(), "assay_{protein}.csv");
        let id = ProteinId::parse("6LU7").unwrap();
        assert!(matches!(source.fetch(&id).await, Err(MolexError::Fetch(_))));
    }

    #[test]
    fn test_http_url_layout() {
        let source = HttpAssaySource::new(
            "https://example.org/data/",
            "assay_{protein}.csv",
            Duration::from_secs(5),
        )
        .unwrap();
        let id = ProteinId::parse("6LU7").unwrap();
        assert_eq!(source.location(&id), "https://example.org/data/assay_6LU7.csv");
    }

    #[test]
    fn test_config_selects_source() {
        let mut config = DataConfig::default();
        let id = ProteinId::parse("6LU7").unwrap();
        let local = source_from_config(&config).unwrap();
        assert!(local.location(&id).ends_with("assay_6LU7.csv"));

        config.assay_base = "http://localhost:9000".into();
        let remote = source_from_config(&config).unwrap();
        assert_eq!(remote.location(&id), "http://localhost:9000/assay_6LU7.csv");
    }
}
