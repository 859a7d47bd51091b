//! Install and uninstall workflow
//!
//! Ties the catalog, the installer and the attempt log together:
//! refuse when installs are disabled, record the attempt, run the
//! installer, record the outcome, drop the stale inventory and verify the
//! installed package's own compatibility declaration.

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};
use vitrine_core::types::{InstallAction, InstallationAttempt};
use vitrine_core::Error;

use crate::attempts::AttemptLog;
use crate::compatibility::PostInstallReport;
use crate::installer::{InstallEnvironment, InstallOutcome, PluginInstaller};
use crate::package_manager::normalize_name;
use crate::service::CatalogService;

/// Everything an administrator needs after an install or uninstall
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub attempt: InstallationAttempt,
    pub outcome: InstallOutcome,
    /// Post-install check; only for successful installs into a live environment
    pub verification: Option<PostInstallReport>,
}

pub struct InstallWorkflow<'a> {
    service: &'a CatalogService,
    installer: &'a PluginInstaller,
    log: &'a AttemptLog,
    allow_install: bool,
}

impl<'a> InstallWorkflow<'a> {
    pub fn new(
        service: &'a CatalogService,
        installer: &'a PluginInstaller,
        log: &'a AttemptLog,
        allow_install: bool,
    ) -> Self {
        Self {
            service,
            installer,
            log,
            allow_install,
        }
    }

    /// Install or upgrade a plugin
    ///
    /// Errors with [`Error::InstallDisabled`] or [`Error::PluginNotFound`];
    /// installer failures are reported in the outcome instead.
    pub async fn install_plugin(
        &self,
        name: &str,
        version: Option<&str>,
        user: Option<String>,
    ) -> Result<WorkflowReport> {
        if !self.allow_install {
            return Err(Error::InstallDisabled.into());
        }

        let plugin = self
            .service
            .get_plugin(name)
            .await
            .ok_or_else(|| Error::plugin_not_found(name))?;

        let version = version.map(str::trim).filter(|v| !v.is_empty());
        let upgrade = plugin.is_installed();
        let action = if upgrade {
            InstallAction::Upgrade
        } else {
            InstallAction::Install
        };

        let mut attempt = InstallationAttempt::begin(
            name,
            version.unwrap_or(plugin.version.as_str()),
            action,
            user,
        );
        self.record(&attempt);

        info!("Starting {}", attempt);
        let outcome = self.installer.install(name, version, upgrade).await;
        self.finish(&mut attempt, &outcome);

        let verification = if outcome.success
            && *self.installer.environment() == InstallEnvironment::WritableVenv
        {
            Some(self.service.checker().verify_post_install(name).await)
        } else {
            None
        };

        Ok(WorkflowReport {
            attempt,
            outcome,
            verification,
        })
    }

    /// Remove a plugin
    pub async fn uninstall_plugin(&self, name: &str, user: Option<String>) -> Result<WorkflowReport> {
        if !self.allow_install {
            return Err(Error::InstallDisabled.into());
        }

        let installed = self.service.installed_inventory().await;
        let version = installed
            .get(&normalize_name(name))
            .cloned()
            .unwrap_or_default();

        let mut attempt =
            InstallationAttempt::begin(name, version, InstallAction::Uninstall, user);
        self.record(&attempt);

        info!("Starting {}", attempt);
        let outcome = self.installer.uninstall(name).await;
        self.finish(&mut attempt, &outcome);

        Ok(WorkflowReport {
            attempt,
            outcome,
            verification: None,
        })
    }

    fn finish(&self, attempt: &mut InstallationAttempt, outcome: &InstallOutcome) {
        attempt.complete(
            outcome.success,
            &outcome.version,
            outcome.output.clone(),
            outcome.error.clone(),
        );
        self.record(attempt);
        self.service.invalidate_inventory();
        info!("Finished {}", attempt);
    }

    fn record(&self, attempt: &InstallationAttempt) {
        if let Err(e) = self.log.record(attempt) {
            warn!("Failed to record {}: {:#}", attempt, e);
        }
    }
}
