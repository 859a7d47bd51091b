//! Registry-sourced package metadata

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Metadata for one package as published on the registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Canonical package name as reported by the registry
    pub name: String,

    /// Latest published version
    pub version: String,

    #[serde(default)]
    pub summary: String,

    /// Long description (usually the README)
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub description_content_type: Option<String>,

    /// Author name, derived from the author-email field when absent
    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub author_email: Option<String>,

    #[serde(default)]
    pub license: String,

    #[serde(default)]
    pub keywords: BTreeSet<String>,

    #[serde(default)]
    pub classifiers: Vec<String>,

    #[serde(default)]
    pub requires_python: Option<String>,

    #[serde(default)]
    pub requires_dist: Vec<String>,

    #[serde(default)]
    pub project_urls: BTreeMap<String, String>,

    /// Home page, falling back to the `Homepage` project URL
    #[serde(default)]
    pub homepage: Option<String>,

    /// Known release version strings, in registry order
    #[serde(default)]
    pub releases: Vec<String>,
}
