//! Registry and curated catalog bodies

use serde_json::{json, Value};

pub const HOST_VERSION: &str = "4.1.3-Docker-3.0.2";

/// Simple index listing
pub fn simple_index(names: &[&str]) -> Value {
    let projects: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
    json!({ "meta": { "api-version": "1.1" }, "projects": projects })
}

/// Minimal package document
pub fn package_document(name: &str, version: &str) -> Value {
    json!({
        "info": {
            "name": name,
            "version": version,
            "summary": format!("{} for NetBox", name),
            "description": "",
            "author": "Example Maintainer",
            "license": "Apache-2.0",
            "keywords": "netbox",
            "home_page": format!("https://example.com/{}", name)
        },
        "releases": { version: [] }
    })
}

/// Curated catalog with one bounded, one unbounded and one featured entry
pub fn curated_catalog() -> Value {
    json!({
        "plugins": {
            "netbox-bgp": {
                "category": "Routing",
                "certification": "certified",
                "netbox_min_version": "4.0.0",
                "featured": true
            },
            "netbox-legacy": {
                "category": "Other",
                "certification": "deprecated",
                "netbox_max_version": "3.7.99",
                "replacement": "netbox-bgp",
                "recommended": false
            },
            "netbox-notes": {
                "category": "Documentation",
                "tags": ["docs"]
            }
        },
        "categories": ["Routing", "Documentation", "Other"],
        "certification_levels": {
            "certified": "Reviewed and tested by maintainers",
            "deprecated": "No longer maintained"
        }
    })
}
