//! PDB structure fetching.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};

/// Client for fetching structure files by URL, with an on-disk cache keyed by
/// file name. `file://` URLs and bare paths are read directly.
#[derive(Debug, Clone)]
pub struct StructureFetcher {
    client: reqwest::Client,
    cache_dir: PathBuf,
}

impl StructureFetcher {
    /// Create a new StructureFetcher with the given cache directory.
    pub fn new<P: AsRef<Path>>(cache_dir: P, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            cache_dir: cache_dir.as_ref().to_path_buf(),
        })
    }

    /// Platform cache directory used when none is configured.
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("molex")
            .join("structures")
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Make sure the cache directory exists.
    pub async fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .with_context(|| format!("Failed to create cache directory {:?}", self.cache_dir))
    }

    /// Fetch a structure file as text.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        if let Some(path) = local_path(url) {
            debug!("Reading structure from {:?}", path);
            return fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {:?}", path));
        }

        let cache_path = self.cache_path(url);
        if let Some(path) = cache_path.as_ref().filter(|p| p.exists()) {
            debug!("Structure {} found in cache", url);
            return fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read cached {:?}", path));
        }

        info!("Fetching structure {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to download {}", url))?
            .error_for_status()?;
        let content = response.text().await?;

        if let Some(path) = cache_path {
            fs::create_dir_all(&self.cache_dir).await?;
            fs::write(&path, &content).await?;
        }

        Ok(content)
    }

    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        let name = url.rsplit('/').next()?.split(['?', '#']).next()?;
        let safe = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        safe.then(|| self.cache_dir.join(name.to_lowercase()))
    }
}

fn local_path(url: &str) -> Option<PathBuf> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if url.contains("://") {
        return None;
    }
    Some(PathBuf::from(url))
}
