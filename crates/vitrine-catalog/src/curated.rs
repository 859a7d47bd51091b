//! Curated catalog loading
//!
//! Sources are tried in order:
//! 1. Remote `catalog-url` (any failure falls through)
//! 2. Local `catalog-path` override, when the file exists and parses
//! 3. The catalog bundled into the binary
//! 4. An empty catalog

use camino::Utf8PathBuf;
use rust_embed::RustEmbed;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use vitrine_core::types::{CatalogConfig, CuratedCatalog};
use vitrine_core::utils::user_agent;
use vitrine_core::{Error, Result};

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/catalog/"]
#[prefix = ""]
struct BundledAssets;

const BUNDLED_CATALOG: &str = "catalog.json";

/// Curated catalog shipped with this release
pub fn bundled_catalog() -> Result<CuratedCatalog> {
    let file = BundledAssets::get(BUNDLED_CATALOG)
        .ok_or_else(|| Error::invalid_config("bundled catalog.json is missing"))?;
    Ok(serde_json::from_slice(&file.data)?)
}

/// Loads curated catalog snapshots
pub struct CuratedLoader {
    client: reqwest::Client,
    url: Option<String>,
    path: Option<Utf8PathBuf>,
}

impl CuratedLoader {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        Self::with_sources(
            config.catalog_url.clone(),
            config.catalog_path.clone(),
            config.http_timeout(),
        )
    }

    pub fn with_sources(
        url: Option<String>,
        path: Option<Utf8PathBuf>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()?;
        Ok(Self {
            client,
            url: url.filter(|u| !u.trim().is_empty()),
            path,
        })
    }

    /// Load a fresh snapshot; never fails
    pub async fn load(&self) -> CuratedCatalog {
        if let Some(url) = &self.url {
            match self.fetch_remote(url).await {
                Ok(catalog) => {
                    info!(
                        "Loaded curated catalog from {} ({} plugins)",
                        url,
                        catalog.plugins.len()
                    );
                    return catalog;
                }
                Err(e) => warn!("Failed to fetch remote catalog {}: {}", url, e),
            }
        }

        if let Some(path) = &self.path {
            if path.exists() {
                match load_file(path) {
                    Ok(catalog) => {
                        debug!(
                            "Loaded curated catalog from {} ({} plugins)",
                            path,
                            catalog.plugins.len()
                        );
                        return catalog;
                    }
                    Err(e) => error!("Failed to parse curated catalog {}: {}", path, e),
                }
            } else {
                debug!("No curated catalog at {}", path);
            }
        }

        match bundled_catalog() {
            Ok(catalog) => {
                debug!("Using bundled curated catalog ({} plugins)", catalog.plugins.len());
                catalog
            }
            Err(e) => {
                error!("Failed to load bundled curated catalog: {}", e);
                CuratedCatalog::default()
            }
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<CuratedCatalog> {
        debug!("Fetching curated catalog from: {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::http_status(url, response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

fn load_file(path: &Utf8PathBuf) -> Result<CuratedCatalog> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
