//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Config file (~/.vitrine/config.yaml, or an explicit path)
//! 3. Environment variables (VITRINE_* prefix)
//! 4. CLI flags (handled by caller)
//!
//! Files are merged key by key, so a file only overrides what it names.

use crate::error::{Error, Result};
use crate::types::CatalogConfig;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::Value;
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

const DEFAULTS_FILE: &str = "vitrine-defaults.yaml";
const CONFIG_FILE: &str = "config.yaml";

/// Configuration hierarchy loader
pub struct ConfigLoader {
    /// Base directory for configuration and state files
    config_dir: Utf8PathBuf,
}

impl ConfigLoader {
    /// Create a loader rooted at ~/.vitrine
    pub fn new() -> Result<Self> {
        let config_dir = Self::default_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Get the standard config directory (~/.vitrine)
    fn default_config_dir() -> Result<Utf8PathBuf> {
        let home = crate::utils::get_home_dir()
            .map_err(|_| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|p| Error::invalid_config(format!("Home directory is not UTF-8: {:?}", p)))?;
        Ok(home.join(".vitrine"))
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Load configuration from the default file location
    pub fn load(&self) -> Result<CatalogConfig> {
        self.load_from(None)
    }

    /// Load configuration, reading `explicit` instead of the default file
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load_from(&self, explicit: Option<&Utf8Path>) -> Result<CatalogConfig> {
        let mut merged = Self::load_embedded_defaults()?;

        let file = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::config_not_found(path.as_str()));
                }
                Some(path.to_path_buf())
            }
            None => {
                let path = self.config_dir.join(CONFIG_FILE);
                path.exists().then_some(path)
            }
        };

        if let Some(path) = file {
            debug!("Loading configuration from {}", path);
            let overlay = Self::load_yaml_file(&path)?;
            merge_values(&mut merged, overlay);
        }

        let mut config: CatalogConfig = serde_yaml_ng::from_value(merged)
            .map_err(|e| Error::invalid_config(format!("Failed to parse configuration: {}", e)))?;

        self.apply_env_overrides(&mut config)?;
        self.resolve_paths(&mut config);
        Self::validate(&config)?;

        Ok(config)
    }

    /// Load the embedded defaults as a YAML value
    fn load_embedded_defaults() -> Result<Value> {
        let embedded_file = EmbeddedConfigs::get(DEFAULTS_FILE).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", DEFAULTS_FILE))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", DEFAULTS_FILE))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                DEFAULTS_FILE, e
            ))
        })
    }

    /// Load a YAML file as a value
    fn load_yaml_file(path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;
        // An empty file parses as null
        Ok(if value.is_null() {
            Value::Mapping(Default::default())
        } else {
            value
        })
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut CatalogConfig) -> Result<()> {
        if let Ok(val) = env::var("VITRINE_CACHE_TIMEOUT") {
            config.cache_timeout = parse_env("VITRINE_CACHE_TIMEOUT", &val)?;
        }

        if let Ok(val) = env::var("VITRINE_INVENTORY_TIMEOUT") {
            config.inventory_timeout = parse_env("VITRINE_INVENTORY_TIMEOUT", &val)?;
        }

        if let Ok(val) = env::var("VITRINE_CATALOG_URL") {
            config.catalog_url = Some(val).filter(|v| !v.trim().is_empty());
        }

        if let Ok(val) = env::var("VITRINE_CATALOG_PATH") {
            config.catalog_path = Some(Utf8PathBuf::from(val));
        }

        if let Ok(val) = env::var("VITRINE_ALLOW_INSTALL") {
            config.allow_install = parse_env("VITRINE_ALLOW_INSTALL", &val)?;
        }

        if let Ok(val) = env::var("VITRINE_SHOW_UNCURATED") {
            config.show_uncurated = parse_env("VITRINE_SHOW_UNCURATED", &val)?;
        }

        if let Ok(val) = env::var("VITRINE_REGISTRY_INDEX_URL") {
            config.registry_index_url = val;
        }

        if let Ok(val) = env::var("VITRINE_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = parse_env("VITRINE_HTTP_TIMEOUT_SECS", &val)?;
        }

        if let Ok(val) = env::var("VITRINE_INSTALL_TIMEOUT_SECS") {
            config.install_timeout_secs = parse_env("VITRINE_INSTALL_TIMEOUT_SECS", &val)?;
        }

        if let Ok(val) = env::var("VITRINE_UNINSTALL_TIMEOUT_SECS") {
            config.uninstall_timeout_secs = parse_env("VITRINE_UNINSTALL_TIMEOUT_SECS", &val)?;
        }

        if let Ok(val) = env::var("VITRINE_REQUIREMENTS_FILE") {
            config.requirements_file = Utf8PathBuf::from(val);
        }

        if let Ok(val) = env::var("VITRINE_ENVIRONMENT") {
            config.environment = val
                .parse()
                .map_err(|e: String| Error::invalid_config(e))?;
        }

        if let Ok(val) = env::var("VITRINE_PYTHON") {
            config.python = val;
        }

        // Host settings
        if let Ok(val) = env::var("VITRINE_HOST_VERSION") {
            config.host.version = val;
        }

        if let Ok(val) = env::var("VITRINE_ACTIVE_PLUGINS") {
            config.host.active_plugins = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(())
    }

    /// Fill unset state paths relative to the config directory
    fn resolve_paths(&self, config: &mut CatalogConfig) {
        if config.catalog_path.is_none() {
            config.catalog_path = Some(self.config_dir.join("catalog.json"));
        }
        if config.cache_file.is_none() {
            config.cache_file = Some(self.config_dir.join("cache").join("catalog-cache.json"));
        }
        if config.attempts_file.is_none() {
            config.attempts_file = Some(self.config_dir.join("attempts.jsonl"));
        }
    }

    fn validate(config: &CatalogConfig) -> Result<()> {
        url::Url::parse(&config.registry_index_url).map_err(|e| {
            Error::invalid_config(format!(
                "registry-index-url '{}' is not a valid URL: {}",
                config.registry_index_url, e
            ))
        })?;

        if let Some(catalog_url) = &config.catalog_url {
            url::Url::parse(catalog_url).map_err(|e| {
                Error::invalid_config(format!(
                    "catalog-url '{}' is not a valid URL: {}",
                    catalog_url, e
                ))
            })?;
        }

        if config.package_prefixes.is_empty() {
            return Err(Error::invalid_config(
                "package-prefixes must name at least one prefix",
            ));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::invalid_config(format!("{} has an invalid value: {}", name, value)))
}

/// Deep-merge `overlay` into `base`; mappings merge, everything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
