//! Install workflow tests
//!
//! Tests cover:
//! - Refusal when installs are disabled or the plugin is unknown
//! - Install vs upgrade selection
//! - Attempt recording and inventory invalidation
//! - Post-install verification

mod common;
use common::*;

use tempfile::TempDir;
use vitrine_catalog::compatibility::PostInstallStatus;
use vitrine_catalog::{AttemptLog, AttemptQuery, InstallWorkflow, PluginInstaller};
use vitrine_core::types::{AttemptStatus, EnvironmentSetting, InstallAction};
use vitrine_core::Error;
use wiremock::MockServer;

async fn setup(
    package_manager: FakePackageManager,
    probe: FakeProbe,
) -> (MockServer, Harness, PluginInstaller, AttemptLog, TempDir) {
    let server = MockServer::start().await;
    mount_registry(&server, &[("netbox-bgp", "0.15.0"), ("netbox-dns", "1.2.0")]).await;
    mount_curated(&server, curated_catalog()).await;

    let mut config = config_for(&server);
    config.environment = EnvironmentSetting::WritableVenv;
    let h = harness(&config, package_manager, probe);
    let installer = PluginInstaller::new(&config, h.package_manager.clone());

    let dir = TempDir::new().unwrap();
    let log = AttemptLog::new(dir.path().join("attempts.jsonl"));
    (server, h, installer, log, dir)
}

#[tokio::test]
async fn test_install_records_attempt() {
    let (_server, h, installer, log, _dir) =
        setup(FakePackageManager::new(), FakeProbe::default()).await;
    let workflow = InstallWorkflow::new(&h.service, &installer, &log, true);

    // Prime the inventory cache so invalidation is observable
    h.service.installed_inventory().await;

    let report = workflow
        .install_plugin("netbox-bgp", None, Some("admin".to_string()))
        .await
        .unwrap();

    assert!(report.outcome.success);
    assert_eq!(report.attempt.action, InstallAction::Install);
    assert_eq!(report.attempt.status, AttemptStatus::Success);
    assert_eq!(report.attempt.version, "9.9.9");
    assert_eq!(
        report.verification.as_ref().map(|v| v.status),
        Some(PostInstallStatus::Ok)
    );

    let history = log.list(&AttemptQuery::default()).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, report.attempt.id);
    assert_eq!(history[0].user.as_deref(), Some("admin"));
    assert!(history[0].completed.is_some());

    let inventory = h.service.installed_inventory().await;
    assert!(inventory.contains_key("netbox-bgp"));
    assert_eq!(h.package_manager.list_calls(), 2);
}

#[tokio::test]
async fn test_installed_plugin_is_upgraded() {
    let (_server, h, installer, log, _dir) = setup(
        FakePackageManager::new().with_installed("netbox-bgp", "0.14.0"),
        FakeProbe::default(),
    )
    .await;
    let workflow = InstallWorkflow::new(&h.service, &installer, &log, true);

    let report = workflow
        .install_plugin("netbox-bgp", Some("0.15.0"), None)
        .await
        .unwrap();

    assert_eq!(report.attempt.action, InstallAction::Upgrade);
    assert_eq!(report.attempt.version, "0.15.0");
    assert_eq!(
        h.package_manager.commands(),
        vec!["install --upgrade netbox-bgp==0.15.0"]
    );
}

#[tokio::test]
async fn test_failed_install_is_recorded() {
    let (_server, h, installer, log, _dir) = setup(
        FakePackageManager::new().failing_install(),
        FakeProbe::default(),
    )
    .await;
    let workflow = InstallWorkflow::new(&h.service, &installer, &log, true);

    let report = workflow.install_plugin("netbox-dns", None, None).await.unwrap();

    assert!(!report.outcome.success);
    assert!(report.verification.is_none());
    assert_eq!(report.attempt.status, AttemptStatus::Failed);
    assert_eq!(report.attempt.version, "1.2.0");

    let history = log.list(&AttemptQuery::default()).unwrap();
    assert!(history[0].error.contains("No matching distribution"));
}

#[tokio::test]
async fn test_declared_incompatibility_warns_after_install() {
    let (_server, h, installer, log, _dir) = setup(
        FakePackageManager::new(),
        FakeProbe::default().declaring("netbox-dns", Some("5.0"), None),
    )
    .await;
    let workflow = InstallWorkflow::new(&h.service, &installer, &log, true);

    let report = workflow.install_plugin("netbox-dns", None, None).await.unwrap();

    assert!(report.outcome.success);
    let verification = report.verification.unwrap();
    assert_eq!(verification.status, PostInstallStatus::Warning);
    assert!(verification.message.contains("Requires NetBox >= 5.0"));
}

#[tokio::test]
async fn test_disabled_installs_are_refused() {
    let (_server, h, installer, log, _dir) =
        setup(FakePackageManager::new(), FakeProbe::default()).await;
    let workflow = InstallWorkflow::new(&h.service, &installer, &log, false);

    let err = workflow.install_plugin("netbox-bgp", None, None).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InstallDisabled)));

    let err = workflow.uninstall_plugin("netbox-bgp", None).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InstallDisabled)));

    assert!(h.package_manager.commands().is_empty());
    assert!(log.list(&AttemptQuery::default()).unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_plugin_is_not_found() {
    let (_server, h, installer, log, _dir) =
        setup(FakePackageManager::new(), FakeProbe::default()).await;
    let workflow = InstallWorkflow::new(&h.service, &installer, &log, true);

    let err = workflow.install_plugin("netbox-missing", None, None).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::PluginNotFound { name }) if name == "netbox-missing"
    ));
    assert!(log.list(&AttemptQuery::default()).unwrap().is_empty());
}

#[tokio::test]
async fn test_uninstall_records_installed_version() {
    let (_server, h, installer, log, _dir) = setup(
        FakePackageManager::new().with_installed("netbox-dns", "1.1.0"),
        FakeProbe::default(),
    )
    .await;
    let workflow = InstallWorkflow::new(&h.service, &installer, &log, true);

    let report = workflow.uninstall_plugin("netbox-dns", None).await.unwrap();

    assert!(report.outcome.success);
    assert_eq!(report.attempt.action, InstallAction::Uninstall);
    assert_eq!(report.attempt.version, "1.1.0");
    assert!(h.service.installed_inventory().await.is_empty());
}
