//! Curated catalog types
//!
//! The curated catalog is a maintainer-controlled JSON document that
//! overrides and augments registry metadata:
//!
//! ```json
//! {
//!   "plugins": {
//!     "netbox-bgp": {
//!       "category": "Routing",
//!       "certification": "certified",
//!       "netbox_min_version": "4.0.0"
//!     }
//!   },
//!   "categories": ["Routing"],
//!   "certification_levels": {"certified": "Reviewed and tested"}
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Curation level assigned by catalog maintainers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Certification {
    #[default]
    Untested,
    Compatible,
    Certified,
    Deprecated,
}

impl Certification {
    /// Map a free-form label onto a certification level
    ///
    /// Unknown labels are logged and treated as `untested`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "untested" | "" => Certification::Untested,
            "compatible" => Certification::Compatible,
            "certified" => Certification::Certified,
            "deprecated" => Certification::Deprecated,
            other => {
                warn!("Unknown certification level '{}', using untested", other);
                Certification::Untested
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Certification::Untested => "untested",
            Certification::Compatible => "compatible",
            Certification::Certified => "certified",
            Certification::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for Certification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maintainer judgment about one package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CuratedEntry {
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Certification label; see [`Certification::from_label`]
    #[serde(default)]
    pub certification: Option<String>,

    /// Lowest supported host version
    #[serde(default, rename = "netbox_min_version")]
    pub min_version: Option<String>,

    /// Highest supported host version
    #[serde(default, rename = "netbox_max_version")]
    pub max_version: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub recommended: Option<bool>,

    #[serde(default)]
    pub featured: Option<bool>,

    #[serde(default)]
    pub documentation_url: Option<String>,

    /// Package that supersedes this one
    #[serde(default)]
    pub replacement: Option<String>,
}

impl CuratedEntry {
    /// Whether the entry carries at least one host-version bound
    pub fn has_bounds(&self) -> bool {
        non_empty(&self.min_version).is_some() || non_empty(&self.max_version).is_some()
    }
}

/// Snapshot of the curated catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CuratedCatalog {
    #[serde(default)]
    pub plugins: BTreeMap<String, CuratedEntry>,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub certification_levels: BTreeMap<String, String>,
}

impl CuratedCatalog {
    /// Curated entry for a package, if the maintainers listed it
    pub fn entry(&self, name: &str) -> Option<&CuratedEntry> {
        self.plugins.get(name)
    }

    /// Whether the package is listed
    pub fn is_curated(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }
}

/// Treat empty strings like missing values
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
