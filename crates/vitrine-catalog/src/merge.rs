//! Registry + curated merge

use vitrine_core::types::{
    non_empty, Certification, CompatSource, CuratedEntry, PackageInfo, PluginRecord,
};
use vitrine_core::version::readme_version_hint;

/// Build a record from registry metadata and an optional curated entry
///
/// Runtime fields and the verdict start at their neutral values
/// (not installed, compatible, source unknown).
pub fn merge_record(name: &str, info: &PackageInfo, curated: Option<&CuratedEntry>) -> PluginRecord {
    let fallback = CuratedEntry::default();
    let entry = curated.unwrap_or(&fallback);
    let text = |value: &Option<String>| non_empty(value).unwrap_or_default().to_string();

    PluginRecord {
        name: name.to_string(),
        version: info.version.clone(),
        summary: info.summary.clone(),
        description: info.description.clone(),
        author: info.author.clone(),
        license: info.license.clone(),
        keywords: info.keywords.clone(),
        homepage: info.homepage.clone().unwrap_or_default(),
        project_urls: info.project_urls.clone(),
        requires_python: info.requires_python.clone().unwrap_or_default(),
        requires_dist: info.requires_dist.clone(),
        releases: info.releases.clone(),

        category: non_empty(&entry.category)
            .unwrap_or(PluginRecord::DEFAULT_CATEGORY)
            .to_string(),
        tags: entry.tags.clone(),
        certification: entry
            .certification
            .as_deref()
            .map(Certification::from_label)
            .unwrap_or_default(),
        min_version: text(&entry.min_version),
        max_version: text(&entry.max_version),
        notes: text(&entry.notes),
        recommended: entry.recommended.unwrap_or(true),
        featured: entry.featured.unwrap_or(false),
        documentation_url: text(&entry.documentation_url),
        replacement: text(&entry.replacement),

        readme_version_hint: readme_version_hint(&info.description),

        installed_version: None,
        activated: false,
        upgrade_available: false,

        compatible: true,
        compatibility_reason: None,
        compatibility_source: CompatSource::Unknown,
    }
}
