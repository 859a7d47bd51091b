//! Command implementations

pub mod categories;
pub mod config;
pub mod history;
pub mod info;
pub mod install;
pub mod list;
pub mod refresh;
pub mod verify;

use std::sync::Arc;

use anyhow::{Context, Result};
use camino::Utf8Path;
use tracing::debug;
use vitrine_catalog::{
    AttemptLog, CatalogDeps, CatalogService, PipPackageManager, PluginInstaller, PythonProbe,
};
use vitrine_core::types::CatalogConfig;
use vitrine_core::{ConfigLoader, TtlCache};

/// Wiring shared by every command
pub struct AppContext {
    pub config: CatalogConfig,
    cache: Arc<TtlCache>,
    package_manager: Arc<PipPackageManager>,
}

impl AppContext {
    /// Load configuration and build the shared cache and package manager
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        let config = load_config(config_path)?;

        let cache = match &config.cache_file {
            Some(path) => TtlCache::persistent(path.as_std_path()),
            None => TtlCache::in_memory(),
        };
        debug!("Host version {}", config.host.version);

        Ok(Self {
            package_manager: Arc::new(PipPackageManager::new(config.python.clone())),
            cache: Arc::new(cache),
            config,
        })
    }

    pub fn service(&self) -> Result<CatalogService> {
        let deps = CatalogDeps {
            cache: Arc::clone(&self.cache),
            package_manager: self.package_manager.clone(),
            probe: Arc::new(PythonProbe::new(self.config.python.clone())),
        };
        CatalogService::new(&self.config, deps).context("Failed to create catalog service")
    }

    pub fn installer(&self) -> PluginInstaller {
        PluginInstaller::new(&self.config, self.package_manager.clone())
    }

    pub fn attempt_log(&self) -> Result<AttemptLog> {
        let path = self
            .config
            .attempts_file
            .as_ref()
            .context("No attempts file configured")?;
        Ok(AttemptLog::new(path.as_std_path()))
    }
}

/// Effective configuration, from `config_path` or the default location
pub fn load_config(config_path: Option<&Utf8Path>) -> Result<CatalogConfig> {
    let loader = ConfigLoader::new().context("Failed to locate config directory")?;
    loader
        .load_from(config_path)
        .context("Failed to load configuration")
}

/// Explicit user, else the login name from the environment
pub fn attempt_user(explicit: Option<String>) -> Option<String> {
    explicit
        .or_else(|| std::env::var("USER").ok())
        .filter(|user| !user.trim().is_empty())
}

/// Pretty-printed JSON on stdout
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Placeholder for empty optional text in tables and detail views
pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
