//! Listing filters

use std::str::FromStr;

use vitrine_core::types::{Certification, CompatSource, PluginRecord};

/// Runtime-state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Installed,
    NotInstalled,
    Activated,
    Upgradable,
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "installed" => Ok(Self::Installed),
            "not_installed" => Ok(Self::NotInstalled),
            "activated" => Ok(Self::Activated),
            "upgradable" => Ok(Self::Upgradable),
            other => Err(format!(
                "unknown status '{}' (expected installed, not_installed, activated or upgradable)",
                other
            )),
        }
    }
}

/// Verdict filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityFilter {
    Compatible,
    Incompatible,
    /// No bounds known for the package
    Unknown,
}

impl FromStr for CompatibilityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compatible" => Ok(Self::Compatible),
            "incompatible" => Ok(Self::Incompatible),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!(
                "unknown compatibility '{}' (expected compatible, incompatible or unknown)",
                other
            )),
        }
    }
}

/// Criteria applied to a plugin listing
#[derive(Debug, Clone, Default)]
pub struct PluginFilter {
    pub category: Option<String>,
    pub certification: Option<Certification>,
    pub status: Option<StatusFilter>,
    pub compatibility: Option<CompatibilityFilter>,
    /// Case-insensitive match on name, summary or author
    pub search: Option<String>,
}

impl PluginFilter {
    pub fn matches(&self, plugin: &PluginRecord) -> bool {
        if self
            .category
            .as_deref()
            .is_some_and(|category| plugin.category != category)
        {
            return false;
        }

        if self
            .certification
            .is_some_and(|certification| plugin.certification != certification)
        {
            return false;
        }

        let status_ok = match self.status {
            None => true,
            Some(StatusFilter::Installed) => plugin.is_installed(),
            Some(StatusFilter::NotInstalled) => !plugin.is_installed(),
            Some(StatusFilter::Activated) => plugin.activated,
            Some(StatusFilter::Upgradable) => plugin.upgrade_available,
        };
        if !status_ok {
            return false;
        }

        let compatibility_ok = match self.compatibility {
            None => true,
            Some(CompatibilityFilter::Compatible) => plugin.compatible,
            Some(CompatibilityFilter::Incompatible) => !plugin.compatible,
            Some(CompatibilityFilter::Unknown) => {
                plugin.compatibility_source == CompatSource::Unknown
            }
        };
        if !compatibility_ok {
            return false;
        }

        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(search) => {
                let needle = search.to_lowercase();
                [&plugin.name, &plugin.summary, &plugin.author]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }

    /// Keep matching plugins, featured first, then by lowercase name
    pub fn apply(&self, plugins: Vec<PluginRecord>) -> Vec<PluginRecord> {
        let mut kept: Vec<PluginRecord> = plugins.into_iter().filter(|p| self.matches(p)).collect();
        sort_plugins(&mut kept);
        kept
    }
}

/// Featured first, then by lowercase name
pub fn sort_plugins(plugins: &mut [PluginRecord]) {
    plugins.sort_by_cached_key(|p| (!p.featured, p.name.to_lowercase()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge_record;
    use vitrine_core::types::{CuratedEntry, PackageInfo, Verdict};

    fn plugin(name: &str, featured: bool) -> PluginRecord {
        let info = PackageInfo {
            name: name.to_string(),
            version: "1.0".to_string(),
            summary: format!("{} summary", name),
            ..PackageInfo::default()
        };
        let entry = CuratedEntry {
            featured: Some(featured),
            ..CuratedEntry::default()
        };
        merge_record(name, &info, Some(&entry))
    }

    #[test]
    fn test_featured_first_then_name() {
        let sorted = PluginFilter::default().apply(vec![
            plugin("netbox-zeta", false),
            plugin("Netbox-Alpha", false),
            plugin("netbox-mid", true),
        ]);
        let names: Vec<&str> = sorted.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["netbox-mid", "Netbox-Alpha", "netbox-zeta"]);
    }

    #[test]
    fn test_status_filters() {
        let mut installed = plugin("netbox-a", false);
        installed.set_installed(Some("0.9".to_string()));
        let fresh = plugin("netbox-b", false);

        let filter = PluginFilter {
            status: Some(StatusFilter::Upgradable),
            ..PluginFilter::default()
        };
        let kept = filter.apply(vec![installed.clone(), fresh.clone()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "netbox-a");

        let filter = PluginFilter {
            status: Some(StatusFilter::NotInstalled),
            ..PluginFilter::default()
        };
        assert_eq!(filter.apply(vec![installed, fresh])[0].name, "netbox-b");
    }

    #[test]
    fn test_compatibility_and_search() {
        let mut broken = plugin("netbox-old", false);
        broken.set_verdict(Verdict::incompatible("Requires NetBox <= 3.7"), CompatSource::Curated);
        let unknown = plugin("netbox-dns", false);

        let incompatible = PluginFilter {
            compatibility: Some(CompatibilityFilter::Incompatible),
            ..PluginFilter::default()
        };
        assert_eq!(incompatible.apply(vec![broken.clone(), unknown.clone()]).len(), 1);

        let unknown_only = PluginFilter {
            compatibility: Some(CompatibilityFilter::Unknown),
            search: Some("DNS".to_string()),
            ..PluginFilter::default()
        };
        let kept = unknown_only.apply(vec![broken, unknown]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "netbox-dns");
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!("not-installed".parse::<StatusFilter>(), Ok(StatusFilter::NotInstalled));
        assert_eq!("Unknown".parse::<CompatibilityFilter>(), Ok(CompatibilityFilter::Unknown));
        assert!("broken".parse::<StatusFilter>().is_err());
    }
}
