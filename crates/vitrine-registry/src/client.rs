//! Registry client
//!
//! Fetches the plugin package list and per-package metadata from the
//! package index, caching both in the shared [`TtlCache`]. Network and
//! decode failures never reach the caller: they are logged and surface as
//! an empty list or `None`, and nothing is cached for a failed fetch.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use tracing::{debug, info, warn};
use vitrine_core::types::{CatalogConfig, PackageInfo};
use vitrine_core::utils::user_agent;
use vitrine_core::{Error, Result, TtlCache};

use crate::pypi::{PackageDocument, SimpleIndex};

/// Cache key for the filtered package list
pub const PACKAGES_KEY: &str = "registry:packages";

/// Cache key prefix for per-package metadata
pub const PACKAGE_KEY_PREFIX: &str = "registry:package:";

const SIMPLE_INDEX_ACCEPT: &str = "application/vnd.pypi.simple.v1+json";

/// Cache key for one package's metadata
pub fn package_key(name: &str) -> String {
    format!("{}{}", PACKAGE_KEY_PREFIX, name.to_lowercase())
}

/// Package index client
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
    prefixes: Vec<String>,
    cache: Arc<TtlCache>,
    cache_ttl: Duration,
}

impl RegistryClient {
    /// Build a client from configuration
    pub fn new(config: &CatalogConfig, cache: Arc<TtlCache>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            client,
            base_url: config.registry_index_url.trim_end_matches('/').to_string(),
            prefixes: config
                .package_prefixes
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            cache,
            cache_ttl: config.cache_ttl(),
        })
    }

    /// Index base URL, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of all index packages matching a plugin prefix
    ///
    /// Served from cache while fresh. On failure returns an empty list.
    pub async fn list_packages(&self) -> Vec<String> {
        if let Some(cached) = self.cache.get::<Vec<String>>(PACKAGES_KEY) {
            debug!("Using cached package list ({} packages)", cached.len());
            return cached;
        }

        match self.fetch_package_list().await {
            Ok(names) => {
                info!("Found {} plugin packages on {}", names.len(), self.base_url);
                self.cache.insert(PACKAGES_KEY, &names, self.cache_ttl);
                names
            }
            Err(e) => {
                warn!("Failed to list packages from {}: {}", self.base_url, e);
                Vec::new()
            }
        }
    }

    /// Metadata for one package
    ///
    /// Served from cache while fresh. Returns `None` on 404 or any failure.
    pub async fn get_package_info(&self, name: &str) -> Option<PackageInfo> {
        let key = package_key(name);
        if let Some(cached) = self.cache.get::<PackageInfo>(&key) {
            debug!("Using cached metadata for {}", name);
            return Some(cached);
        }

        match self.fetch_package_info(name).await {
            Ok(Some(info)) => {
                self.cache.insert(&key, &info, self.cache_ttl);
                Some(info)
            }
            Ok(None) => {
                debug!("Package {} not found on index", name);
                None
            }
            Err(e) => {
                warn!("Failed to fetch metadata for {}: {}", name, e);
                None
            }
        }
    }

    /// Drop the cached package list and all cached package metadata
    pub fn invalidate(&self) {
        self.cache.invalidate(PACKAGES_KEY);
        let dropped = self.cache.invalidate_prefix(PACKAGE_KEY_PREFIX);
        debug!("Invalidated registry cache ({} package entries)", dropped);
    }

    async fn fetch_package_list(&self) -> Result<Vec<String>> {
        let url = format!("{}/simple/", self.base_url);
        debug!("Fetching package index from: {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, SIMPLE_INDEX_ACCEPT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::http_status(url, response.status().as_u16()));
        }

        let index: SimpleIndex = response.json().await?;
        Ok(index.matching(&self.prefixes))
    }

    async fn fetch_package_info(&self, name: &str) -> Result<Option<PackageInfo>> {
        let url = format!("{}/pypi/{}/json", self.base_url, name);
        debug!("Fetching package metadata from: {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::http_status(url, response.status().as_u16()));
        }

        let document: PackageDocument = response.json().await?;
        Ok(Some(document.into_package_info(name)))
    }
}
