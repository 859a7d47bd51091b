//! Wiremock setup and service construction

use std::sync::Arc;

use serde_json::Value;
use vitrine_catalog::{CatalogDeps, CatalogService};
use vitrine_core::types::CatalogConfig;
use vitrine_core::TtlCache;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fakes::{FakePackageManager, FakeProbe};
use super::fixtures::*;

/// Serve the simple index, plugin documents and the curated catalog
pub async fn mount_registry(server: &MockServer, packages: &[(&str, &str)]) {
    let names: Vec<&str> = packages.iter().map(|(name, _)| *name).collect();
    let mut listed = names.clone();
    listed.push("django-tables2");

    Mock::given(method("GET"))
        .and(path("/simple/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(simple_index(&listed)))
        .mount(server)
        .await;

    for (name, version) in packages {
        mount_package(server, name, package_document(name, version)).await;
    }
}

pub async fn mount_package(server: &MockServer, name: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/pypi/{}/json", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_curated(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/catalog.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Configuration pointing at `server` for registry and curated catalog
pub fn config_for(server: &MockServer) -> CatalogConfig {
    let mut config = CatalogConfig {
        registry_index_url: server.uri(),
        catalog_url: Some(format!("{}/catalog.json", server.uri())),
        http_timeout_secs: 5,
        ..CatalogConfig::default()
    };
    config.host.version = HOST_VERSION.to_string();
    config
}

/// Service plus handles on its fakes and cache
pub struct Harness {
    pub service: CatalogService,
    pub cache: Arc<TtlCache>,
    pub package_manager: Arc<FakePackageManager>,
    pub probe: Arc<FakeProbe>,
}

pub fn harness(
    config: &CatalogConfig,
    package_manager: FakePackageManager,
    probe: FakeProbe,
) -> Harness {
    let cache = Arc::new(TtlCache::in_memory());
    let package_manager = Arc::new(package_manager);
    let probe = Arc::new(probe);
    let service = CatalogService::new(
        config,
        CatalogDeps {
            cache: Arc::clone(&cache),
            package_manager: package_manager.clone(),
            probe: probe.clone(),
        },
    )
    .unwrap();

    Harness {
        service,
        cache,
        package_manager,
        probe,
    }
}
