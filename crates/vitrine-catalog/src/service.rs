//! Catalog service
//!
//! Merges three partially-missing sources into [`PluginRecord`]s:
//! - registry metadata from [`RegistryClient`]
//! - the curated catalog snapshot
//! - the installed-package inventory and the host's active plugin list
//!
//! and annotates each record with a compatibility verdict. Records are
//! built fresh per call. Result order is unspecified; see
//! [`crate::filter::PluginFilter`] for sorting.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info};
use vitrine_core::types::{CatalogConfig, CuratedCatalog, PackageInfo, PluginRecord};
use vitrine_core::{Result, TtlCache};
use vitrine_registry::RegistryClient;

use crate::compatibility::{CompatibilityChecker, ConstraintProbe};
use crate::curated::CuratedLoader;
use crate::merge::merge_record;
use crate::package_manager::{normalize_name, PackageManager};

/// Cache key for the installed-package inventory
pub const INVENTORY_KEY: &str = "inventory:installed";

/// Host-side collaborators of the catalog
pub struct CatalogDeps {
    pub cache: Arc<TtlCache>,
    pub package_manager: Arc<dyn PackageManager>,
    pub probe: Arc<dyn ConstraintProbe>,
}

/// Merged view over registry, curated catalog and installed state
pub struct CatalogService {
    registry: RegistryClient,
    checker: CompatibilityChecker,
    curated_loader: CuratedLoader,
    curated: Mutex<Option<Arc<CuratedCatalog>>>,
    package_manager: Arc<dyn PackageManager>,
    cache: Arc<TtlCache>,
    inventory_ttl: Duration,
    active_plugins: BTreeSet<String>,
}

impl CatalogService {
    pub fn new(config: &CatalogConfig, deps: CatalogDeps) -> Result<Self> {
        Ok(Self {
            registry: RegistryClient::new(config, Arc::clone(&deps.cache))?,
            checker: CompatibilityChecker::new(&config.host.version, deps.probe),
            curated_loader: CuratedLoader::new(config)?,
            curated: Mutex::new(None),
            package_manager: deps.package_manager,
            cache: deps.cache,
            inventory_ttl: config.inventory_ttl(),
            active_plugins: config.host.active_plugins.iter().cloned().collect(),
        })
    }

    pub fn checker(&self) -> &CompatibilityChecker {
        &self.checker
    }

    pub fn registry(&self) -> &RegistryClient {
        &self.registry
    }

    /// Current curated snapshot, loading it on first use
    pub async fn curated(&self) -> Arc<CuratedCatalog> {
        if let Some(catalog) = self.curated_slot().as_ref() {
            return Arc::clone(catalog);
        }

        // Concurrent first loads race; the last one stored wins
        let catalog = Arc::new(self.curated_loader.load().await);
        *self.curated_slot() = Some(Arc::clone(&catalog));
        catalog
    }

    fn curated_slot(&self) -> std::sync::MutexGuard<'_, Option<Arc<CuratedCatalog>>> {
        self.curated.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All plugins on the registry, merged and annotated
    ///
    /// With `include_uncurated = false`, packages without a curated entry
    /// are skipped. Packages whose metadata cannot be fetched are skipped.
    pub async fn list_plugins(&self, include_uncurated: bool) -> Vec<PluginRecord> {
        let names = self.registry.list_packages().await;
        let curated = self.curated().await;
        let installed = self.installed_inventory().await;

        let mut plugins = Vec::with_capacity(names.len());
        for name in &names {
            if !include_uncurated && !curated.is_curated(name) {
                continue;
            }
            let Some(info) = self.registry.get_package_info(name).await else {
                debug!("Skipping {}: no registry metadata", name);
                continue;
            };
            plugins.push(self.build_record(name, &info, &curated, &installed).await);
        }

        info!("Listed {} of {} registry packages", plugins.len(), names.len());
        plugins
    }

    /// One plugin, or `None` when the registry has no entry for it
    pub async fn get_plugin(&self, name: &str) -> Option<PluginRecord> {
        let info = self.registry.get_package_info(name).await?;
        let curated = self.curated().await;
        let installed = self.installed_inventory().await;
        Some(self.build_record(name, &info, &curated, &installed).await)
    }

    async fn build_record(
        &self,
        name: &str,
        info: &PackageInfo,
        curated: &CuratedCatalog,
        installed: &BTreeMap<String, String>,
    ) -> PluginRecord {
        let entry = curated.entry(name);
        let mut record = merge_record(name, info, entry);

        record.set_installed(installed.get(&normalize_name(name)).cloned());
        record.activated = self.active_plugins.contains(&record.module_name());

        // Declared constraints only exist for installed copies
        let resolution = if record.is_installed() {
            self.checker.resolve(name, entry).await
        } else {
            self.checker.resolve_from(entry, None)
        };
        record.set_verdict(resolution.verdict, resolution.source);
        record
    }

    /// Installed packages as normalized name → version
    ///
    /// Cached separately from registry data with a short TTL. A failed
    /// query yields an empty inventory and is not cached.
    pub async fn installed_inventory(&self) -> BTreeMap<String, String> {
        if let Some(cached) = self.cache.get::<BTreeMap<String, String>>(INVENTORY_KEY) {
            debug!("Using cached inventory ({} packages)", cached.len());
            return cached;
        }

        match self.package_manager.list_installed().await {
            Ok(packages) => {
                let inventory: BTreeMap<String, String> = packages
                    .into_iter()
                    .map(|(name, version)| (normalize_name(&name), version))
                    .collect();
                self.cache.insert(INVENTORY_KEY, &inventory, self.inventory_ttl);
                inventory
            }
            Err(e) => {
                error!("Failed to get installed packages: {:#}", e);
                BTreeMap::new()
            }
        }
    }

    /// Module names of enabled plugins
    pub fn active_plugins(&self) -> &BTreeSet<String> {
        &self.active_plugins
    }

    /// Curated category names
    pub async fn categories(&self) -> Vec<String> {
        self.curated().await.categories.clone()
    }

    /// Curated certification level descriptions
    pub async fn certification_levels(&self) -> BTreeMap<String, String> {
        self.curated().await.certification_levels.clone()
    }

    /// Drop the installed inventory so the next read re-queries it
    pub fn invalidate_inventory(&self) {
        self.cache.invalidate(INVENTORY_KEY);
    }

    /// Drop registry, inventory and curated snapshots
    pub fn refresh(&self) {
        self.registry.invalidate();
        self.invalidate_inventory();
        *self.curated_slot() = None;
        info!("Catalog caches cleared");
    }
}
