//! Package index wire formats
//!
//! Two read-only documents are consumed:
//! - the simple index (`GET /simple/`, JSON flavour), a `projects` list of
//!   `{name}` objects
//! - per-package metadata (`GET /pypi/<name>/json`), `{info, releases}`
//!
//! Index metadata is loosely typed in practice: most fields may be `null`,
//! and `keywords` is either a comma-separated string or a list.

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use vitrine_core::types::PackageInfo;

/// Simple index listing
#[derive(Debug, Default, Deserialize)]
pub struct SimpleIndex {
    #[serde(default)]
    pub projects: Vec<SimpleProject>,
}

#[derive(Debug, Deserialize)]
pub struct SimpleProject {
    pub name: String,
}

impl SimpleIndex {
    /// Project names whose lowercase form starts with one of `prefixes`
    pub fn matching(self, prefixes: &[String]) -> Vec<String> {
        self.projects
            .into_iter()
            .map(|p| p.name)
            .filter(|name| {
                let lower = name.to_lowercase();
                prefixes.iter().any(|prefix| lower.starts_with(prefix.as_str()))
            })
            .collect()
    }
}

/// Per-package metadata document
#[derive(Debug, Default, Deserialize)]
pub struct PackageDocument {
    #[serde(default)]
    pub info: RawInfo,

    /// Release version strings in document order
    #[serde(default, deserialize_with = "release_keys")]
    pub releases: Vec<String>,
}

/// The `info` object of a package document
#[derive(Debug, Default, Deserialize)]
pub struct RawInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub description_content_type: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub license: Option<String>,
    pub keywords: Option<RawKeywords>,
    pub classifiers: Option<Vec<String>>,
    pub requires_python: Option<String>,
    pub requires_dist: Option<Vec<String>>,
    pub project_urls: Option<BTreeMap<String, String>>,
    pub home_page: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawKeywords {
    Joined(String),
    List(Vec<String>),
}

impl RawKeywords {
    fn normalize(self) -> BTreeSet<String> {
        let items: Vec<String> = match self {
            RawKeywords::Joined(joined) => joined.split(',').map(String::from).collect(),
            RawKeywords::List(list) => list,
        };
        items
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect()
    }
}

impl PackageDocument {
    /// Flatten the document into [`PackageInfo`]
    ///
    /// `requested` names the package when the document omits it.
    pub fn into_package_info(self, requested: &str) -> PackageInfo {
        let info = self.info;
        let project_urls = info.project_urls.unwrap_or_default();

        let author = match non_blank(info.author) {
            Some(author) => author,
            None => info
                .author_email
                .as_deref()
                .map(author_from_email)
                .unwrap_or_default(),
        };

        let homepage = non_blank(info.home_page).or_else(|| {
            project_urls
                .iter()
                .find(|(label, _)| label.eq_ignore_ascii_case("homepage"))
                .map(|(_, url)| url.clone())
        });

        PackageInfo {
            name: non_blank(info.name).unwrap_or_else(|| requested.to_string()),
            version: info.version.unwrap_or_default(),
            summary: info.summary.unwrap_or_default(),
            description: info.description.unwrap_or_default(),
            description_content_type: info.description_content_type,
            author,
            author_email: info.author_email,
            license: info.license.unwrap_or_default(),
            keywords: info.keywords.map(RawKeywords::normalize).unwrap_or_default(),
            classifiers: info.classifiers.unwrap_or_default(),
            requires_python: non_blank(info.requires_python),
            requires_dist: info.requires_dist.unwrap_or_default(),
            project_urls,
            homepage,
            releases: self.releases,
        }
    }
}

/// Author name from a `"Name <email>"` field; the whole field otherwise
pub fn author_from_email(field: &str) -> String {
    match field.split_once('<') {
        Some((name, _)) => name.trim().to_string(),
        None => field.trim().to_string(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Collect the keys of a JSON object in document order
fn release_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of release versions")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut keys = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, IgnoredAny)) = map.next_entry::<String, IgnoredAny>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}
