//! Wiremock setup helpers for the package index

use std::sync::Arc;

use serde_json::Value;
use vitrine_core::types::CatalogConfig;
use vitrine_core::TtlCache;
use vitrine_registry::RegistryClient;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Client pointed at `server` with a fresh in-memory cache
pub fn client_for(server: &MockServer) -> (RegistryClient, Arc<TtlCache>) {
    let config = CatalogConfig {
        registry_index_url: server.uri(),
        http_timeout_secs: 5,
        ..CatalogConfig::default()
    };
    let cache = Arc::new(TtlCache::in_memory());
    let client = RegistryClient::new(&config, Arc::clone(&cache)).unwrap();
    (client, cache)
}

/// Serve the simple index at `/simple/` exactly `times` times
pub async fn mock_simple_index(server: &MockServer, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path("/simple/"))
        .and(header("accept", "application/vnd.pypi.simple.v1+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(times)
        .expect(times)
        .mount(server)
        .await;
}

/// Serve one package document exactly `times` times
pub async fn mock_package(server: &MockServer, name: &str, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/pypi/{}/json", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(times)
        .expect(times)
        .mount(server)
        .await;
}

/// Answer every request for `route` with `status`
pub async fn mock_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
