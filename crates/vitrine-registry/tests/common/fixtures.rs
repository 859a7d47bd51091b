//! Index response bodies

use serde_json::{json, Value};

/// Simple index listing with plugins and unrelated projects
pub fn simple_index(names: &[&str]) -> Value {
    let projects: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
    json!({
        "meta": { "api-version": "1.1" },
        "projects": projects,
    })
}

/// Package metadata document at `version`
pub fn package_document(name: &str, version: &str) -> Value {
    let mut releases = serde_json::Map::new();
    releases.insert("0.9.0".to_string(), json!([]));
    releases.insert(
        version.to_string(),
        json!([{ "filename": format!("{}-{}.tar.gz", name, version) }]),
    );

    json!({
        "info": {
            "name": name,
            "version": version,
            "summary": format!("{} summary", name),
            "description": "Compatible with NetBox 4.1",
            "description_content_type": "text/markdown",
            "author": null,
            "author_email": "Network Team <net@example.com>",
            "license": "Apache-2.0",
            "keywords": "netbox,plugin",
            "classifiers": ["Framework :: Django"],
            "requires_python": ">=3.10",
            "requires_dist": ["netbox-plugin-base>=1.0"],
            "project_urls": { "Homepage": format!("https://example.com/{}", name) },
            "home_page": ""
        },
        "releases": releases
    })
}
