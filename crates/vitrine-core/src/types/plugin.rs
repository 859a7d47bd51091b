//! Merged plugin view

use super::curated::Certification;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Where a compatibility verdict's bounds came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatSource {
    /// Curated catalog bounds
    Curated,
    /// Bounds declared by an installed copy of the package
    PluginDeclared,
    /// No bounds known
    #[default]
    Unknown,
}

impl CompatSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompatSource::Curated => "curated",
            CompatSource::PluginDeclared => "plugin_declared",
            CompatSource::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CompatSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compatibility determination against the host version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub compatible: bool,
    pub reason: Option<String>,
}

impl Verdict {
    pub fn compatible() -> Self {
        Self {
            compatible: true,
            reason: None,
        }
    }

    pub fn incompatible(reason: impl Into<String>) -> Self {
        Self {
            compatible: false,
            reason: Some(reason.into()),
        }
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::compatible()
    }
}

/// Registry metadata merged with curated data, runtime state and a verdict
///
/// Built fresh for every query and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub name: String,

    // Registry
    pub version: String,
    pub summary: String,
    pub description: String,
    pub author: String,
    pub license: String,
    pub keywords: BTreeSet<String>,
    pub homepage: String,
    pub project_urls: BTreeMap<String, String>,
    pub requires_python: String,
    pub requires_dist: Vec<String>,
    pub releases: Vec<String>,

    // Curated
    pub category: String,
    pub tags: Vec<String>,
    pub certification: Certification,
    pub min_version: String,
    pub max_version: String,
    pub notes: String,
    pub recommended: bool,
    pub featured: bool,
    pub documentation_url: String,
    pub replacement: String,

    /// Host version mentioned in the description, if any
    pub readme_version_hint: Option<String>,

    // Runtime
    pub installed_version: Option<String>,
    pub activated: bool,
    pub upgrade_available: bool,

    // Verdict
    pub compatible: bool,
    pub compatibility_reason: Option<String>,
    pub compatibility_source: CompatSource,
}

impl PluginRecord {
    /// Default category for packages without a curated category
    pub const DEFAULT_CATEGORY: &'static str = "Other";

    /// Record runtime state from the installed inventory
    ///
    /// `upgrade_available` is set exactly when an installed version exists
    /// and differs, as a string, from the registry version.
    pub fn set_installed(&mut self, installed_version: Option<String>) {
        self.upgrade_available = installed_version
            .as_deref()
            .is_some_and(|installed| installed != self.version);
        self.installed_version = installed_version;
    }

    /// Whether any version of the package is installed
    pub fn is_installed(&self) -> bool {
        self.installed_version.is_some()
    }

    /// Host module name for this package
    pub fn module_name(&self) -> String {
        module_name(&self.name)
    }

    /// Attach a compatibility verdict
    pub fn set_verdict(&mut self, verdict: Verdict, source: CompatSource) {
        self.compatible = verdict.compatible;
        self.compatibility_reason = verdict.reason;
        self.compatibility_source = source;
    }
}

/// Module name the host uses for a package (`netbox-foo` → `netbox_foo`)
pub fn module_name(package_name: &str) -> String {
    package_name.replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(version: &str) -> PluginRecord {
        PluginRecord {
            name: "netbox-x".to_string(),
            version: version.to_string(),
            summary: String::new(),
            description: String::new(),
            author: String::new(),
            license: String::new(),
            keywords: BTreeSet::new(),
            homepage: String::new(),
            project_urls: BTreeMap::new(),
            requires_python: String::new(),
            requires_dist: Vec::new(),
            releases: Vec::new(),
            category: PluginRecord::DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
            certification: Certification::Untested,
            min_version: String::new(),
            max_version: String::new(),
            notes: String::new(),
            recommended: true,
            featured: false,
            documentation_url: String::new(),
            replacement: String::new(),
            readme_version_hint: None,
            installed_version: None,
            activated: false,
            upgrade_available: false,
            compatible: true,
            compatibility_reason: None,
            compatibility_source: CompatSource::Unknown,
        }
    }

    #[test]
    fn test_upgrade_available_only_when_installed_and_different() {
        let mut plugin = record("1.1.0");
        plugin.set_installed(None);
        assert!(!plugin.upgrade_available);

        plugin.set_installed(Some("1.1.0".to_string()));
        assert!(!plugin.upgrade_available);
        assert!(plugin.is_installed());

        plugin.set_installed(Some("1.0.0".to_string()));
        assert!(plugin.upgrade_available);
    }

    #[test]
    fn test_upgrade_compares_strings_not_versions() {
        let mut plugin = record("1.0");
        plugin.set_installed(Some("1.0.0".to_string()));
        assert!(plugin.upgrade_available);
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name("netbox-bgp-plugin"), "netbox_bgp_plugin");
        assert_eq!(record("1").module_name(), "netbox_x");
    }

    #[test]
    fn test_source_serialization() {
        let json = serde_json::to_string(&CompatSource::PluginDeclared).unwrap();
        assert_eq!(json, "\"plugin_declared\"");
    }
}
