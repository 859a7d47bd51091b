//! Catalog configuration types
//!
//! Deserialized from kebab-case YAML. Every field has a default so a
//! partial file only overrides what it names.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogConfig {
    /// Registry cache lifetime in seconds
    #[serde(default = "default_cache_timeout")]
    pub cache_timeout: u64,

    /// Installed-inventory cache lifetime in seconds
    #[serde(default = "default_inventory_timeout")]
    pub inventory_timeout: u64,

    /// Remote curated catalog URL
    #[serde(default)]
    pub catalog_url: Option<String>,

    /// Local curated catalog file
    #[serde(default)]
    pub catalog_path: Option<Utf8PathBuf>,

    /// Allow install/uninstall operations
    #[serde(default = "default_true")]
    pub allow_install: bool,

    /// Show packages without a curated entry
    #[serde(default = "default_true")]
    pub show_uncurated: bool,

    /// Base URL of the package index
    #[serde(default = "default_registry_index_url")]
    pub registry_index_url: String,

    /// Lowercase name prefixes that identify plugins on the index
    #[serde(default = "default_package_prefixes")]
    pub package_prefixes: Vec<String>,

    /// HTTP timeout in seconds for registry and catalog fetches
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Package-manager timeout in seconds for installs
    #[serde(default = "default_install_timeout")]
    pub install_timeout_secs: u64,

    /// Package-manager timeout in seconds for uninstalls
    #[serde(default = "default_uninstall_timeout")]
    pub uninstall_timeout_secs: u64,

    /// Installation environment
    #[serde(default)]
    pub environment: EnvironmentSetting,

    /// Requirements file used in immutable-image environments
    #[serde(default = "default_requirements_file")]
    pub requirements_file: Utf8PathBuf,

    /// Host interpreter used to run pip and probe installed packages
    #[serde(default = "default_python")]
    pub python: String,

    /// Persistent cache file
    #[serde(default)]
    pub cache_file: Option<Utf8PathBuf>,

    /// Installation attempt ledger
    #[serde(default)]
    pub attempts_file: Option<Utf8PathBuf>,

    /// Host application settings
    #[serde(default)]
    pub host: HostConfig,
}

impl CatalogConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_timeout)
    }

    pub fn inventory_ttl(&self) -> Duration {
        Duration::from_secs(self.inventory_timeout)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    pub fn uninstall_timeout(&self) -> Duration {
        Duration::from_secs(self.uninstall_timeout_secs)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_timeout: default_cache_timeout(),
            inventory_timeout: default_inventory_timeout(),
            catalog_url: None,
            catalog_path: None,
            allow_install: true,
            show_uncurated: true,
            registry_index_url: default_registry_index_url(),
            package_prefixes: default_package_prefixes(),
            http_timeout_secs: default_http_timeout(),
            install_timeout_secs: default_install_timeout(),
            uninstall_timeout_secs: default_uninstall_timeout(),
            environment: EnvironmentSetting::default(),
            requirements_file: default_requirements_file(),
            python: default_python(),
            cache_file: None,
            attempts_file: None,
            host: HostConfig::default(),
        }
    }
}

/// Host application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostConfig {
    /// Running host version, possibly vendor-suffixed
    #[serde(default = "default_host_version")]
    pub version: String,

    /// Enabled plugin module names
    #[serde(default)]
    pub active_plugins: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version: default_host_version(),
            active_plugins: Vec::new(),
        }
    }
}

/// How packages get installed on this host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentSetting {
    /// Detect at startup
    #[default]
    Auto,
    /// pip can write to the running environment
    WritableVenv,
    /// Packages go into a requirements file baked into the next image build
    ImmutableImage,
}

impl std::str::FromStr for EnvironmentSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "writable-venv" => Ok(Self::WritableVenv),
            "immutable-image" => Ok(Self::ImmutableImage),
            other => Err(format!(
                "unknown environment '{}' (expected auto, writable-venv or immutable-image)",
                other
            )),
        }
    }
}

fn default_cache_timeout() -> u64 {
    3600 // 1 hour
}
fn default_inventory_timeout() -> u64 {
    60 // 1 minute
}
fn default_true() -> bool {
    true
}
fn default_registry_index_url() -> String {
    "https://pypi.org".to_string()
}
fn default_package_prefixes() -> Vec<String> {
    vec!["netbox-".to_string(), "netbox_".to_string()]
}
fn default_http_timeout() -> u64 {
    30
}
fn default_install_timeout() -> u64 {
    300 // 5 minutes
}
fn default_uninstall_timeout() -> u64 {
    60
}
fn default_requirements_file() -> Utf8PathBuf {
    Utf8PathBuf::from("/opt/netbox/requirements-extra.txt")
}
fn default_python() -> String {
    "python3".to_string()
}
fn default_host_version() -> String {
    "4.0.0".to_string()
}
