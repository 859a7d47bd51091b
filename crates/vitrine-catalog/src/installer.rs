//! Plugin installation
//!
//! One installer covers both deployment shapes:
//!
//! - **writable-venv**: the package manager installs into the running
//!   environment
//! - **immutable-image**: the running environment is baked into a container
//!   image, so installs are recorded in a requirements file that the next
//!   image build picks up
//!
//! Every failure becomes an [`InstallOutcome`] with `success = false`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{info, warn};
use vitrine_core::types::{module_name, CatalogConfig, EnvironmentSetting};

use crate::package_manager::{normalize_name, PackageManager};

/// How packages reach the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallEnvironment {
    WritableVenv,
    ImmutableImage { requirements_file: Utf8PathBuf },
}

impl InstallEnvironment {
    /// Resolve a configured setting, detecting for `auto`
    pub fn from_setting(setting: EnvironmentSetting, requirements_file: &Utf8Path) -> Self {
        match setting {
            EnvironmentSetting::WritableVenv => Self::WritableVenv,
            EnvironmentSetting::ImmutableImage => Self::ImmutableImage {
                requirements_file: requirements_file.to_path_buf(),
            },
            EnvironmentSetting::Auto => Self::detect(requirements_file),
        }
    }

    /// Immutable-image when running in a container that has a requirements file
    pub fn detect(requirements_file: &Utf8Path) -> Self {
        if is_container() && requirements_file.exists() {
            info!(
                "Container detected, recording installs in {}",
                requirements_file
            );
            Self::ImmutableImage {
                requirements_file: requirements_file.to_path_buf(),
            }
        } else {
            Self::WritableVenv
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WritableVenv => "writable-venv",
            Self::ImmutableImage { .. } => "immutable-image",
        }
    }
}

/// Whether this process runs inside a container
pub fn is_container() -> bool {
    if Path::new("/.dockerenv").exists() {
        return true;
    }
    if fs::read_to_string("/proc/1/cgroup").is_ok_and(|cgroup| cgroup.contains("docker")) {
        return true;
    }
    std::env::var("NETBOX_DOCKER").is_ok_and(|v| v == "true")
}

/// Result of an install or uninstall
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallOutcome {
    pub success: bool,
    pub package: String,
    /// Version installed, or the requested version; empty when unknown
    pub version: String,
    pub output: String,
    pub error: String,
}

impl InstallOutcome {
    fn ok(package: &str, version: &str, output: impl Into<String>) -> Self {
        Self {
            success: true,
            package: package.to_string(),
            version: version.to_string(),
            output: output.into(),
            error: String::new(),
        }
    }

    fn failed(package: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            package: package.to_string(),
            error: error.into(),
            ..Self::default()
        }
    }
}

/// A post-install step shown to the administrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PostInstallCommand {
    pub label: &'static str,
    pub command: &'static str,
}

/// Commands to run after enabling a plugin
pub fn post_install_commands() -> [PostInstallCommand; 4] {
    [
        PostInstallCommand {
            label: "migrate",
            command: "python manage.py migrate",
        },
        PostInstallCommand {
            label: "collectstatic",
            command: "python manage.py collectstatic --no-input",
        },
        PostInstallCommand {
            label: "restart (docker)",
            command: "docker-compose restart netbox",
        },
        PostInstallCommand {
            label: "restart (systemd)",
            command: "sudo systemctl restart netbox",
        },
    ]
}

/// `configuration.py` snippet enabling the plugin
pub fn config_snippet(package_name: &str) -> String {
    let module = module_name(package_name);
    format!(
        r#"# Add to PLUGINS list in configuration.py:
PLUGINS = [
    # ... existing plugins ...
    "{module}",
]

# Add plugin configuration (if needed):
PLUGINS_CONFIG = {{
    # ... existing config ...
    "{module}": {{
        # Plugin-specific settings here
    }},
}}
"#
    )
}

/// Installs and removes plugin packages
pub struct PluginInstaller {
    environment: InstallEnvironment,
    package_manager: Arc<dyn PackageManager>,
    install_timeout: Duration,
    uninstall_timeout: Duration,
}

impl PluginInstaller {
    pub fn new(config: &CatalogConfig, package_manager: Arc<dyn PackageManager>) -> Self {
        Self {
            environment: InstallEnvironment::from_setting(
                config.environment,
                &config.requirements_file,
            ),
            package_manager,
            install_timeout: config.install_timeout(),
            uninstall_timeout: config.uninstall_timeout(),
        }
    }

    pub fn with_environment(mut self, environment: InstallEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> &InstallEnvironment {
        &self.environment
    }

    /// Install `name`, pinned to `version` when given
    pub async fn install(&self, name: &str, version: Option<&str>, upgrade: bool) -> InstallOutcome {
        let version = version.filter(|v| !v.trim().is_empty());
        match &self.environment {
            InstallEnvironment::WritableVenv => self.pip_install(name, version, upgrade).await,
            InstallEnvironment::ImmutableImage { requirements_file } => {
                add_requirement(requirements_file, name, version)
            }
        }
    }

    /// Remove `name`
    pub async fn uninstall(&self, name: &str) -> InstallOutcome {
        match &self.environment {
            InstallEnvironment::WritableVenv => self.pip_uninstall(name).await,
            InstallEnvironment::ImmutableImage { requirements_file } => {
                remove_requirement(requirements_file, name)
            }
        }
    }

    async fn pip_install(&self, name: &str, version: Option<&str>, upgrade: bool) -> InstallOutcome {
        if !self.package_manager.is_available().await {
            let mut message = "pip is not available in this environment.".to_string();
            if is_container() {
                message.push_str(
                    "\n\nThis host runs in a container. Set environment to immutable-image \
                     to record the package in the requirements file, then rebuild the image.",
                );
            }
            return InstallOutcome::failed(name, message);
        }

        let spec = match version {
            Some(v) => format!("{}=={}", name, v),
            None => name.to_string(),
        };
        info!("Installing {}", spec);

        let output = self
            .package_manager
            .install(&spec, upgrade, self.install_timeout)
            .await;

        if output.success {
            let installed = self
                .package_manager
                .show_version(name)
                .await
                .or_else(|| version.map(String::from))
                .unwrap_or_default();
            info!("Installed {} {}", name, installed);
            InstallOutcome {
                success: true,
                package: name.to_string(),
                version: installed,
                output: output.stdout,
                error: String::new(),
            }
        } else {
            warn!("Install of {} failed (exit {:?})", spec, output.exit_code);
            InstallOutcome {
                success: false,
                package: name.to_string(),
                version: version.unwrap_or_default().to_string(),
                output: output.stdout,
                error: output.stderr,
            }
        }
    }

    async fn pip_uninstall(&self, name: &str) -> InstallOutcome {
        if !self.package_manager.is_available().await {
            return InstallOutcome::failed(name, "pip is not available in this environment.");
        }

        info!("Uninstalling {}", name);
        let output = self
            .package_manager
            .uninstall(name, self.uninstall_timeout)
            .await;

        InstallOutcome {
            success: output.success,
            package: name.to_string(),
            version: String::new(),
            output: output.stdout,
            error: if output.success {
                String::new()
            } else {
                output.stderr
            },
        }
    }
}

/// Package name of a requirement line; `None` for blanks and comments
pub fn requirement_name(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let end = line
        .find(|c: char| matches!(c, '<' | '>' | '=' | '!' | '~' | ';' | '[' | '@' | ' '))
        .unwrap_or(line.len());
    Some(line[..end].trim())
}

fn not_writable(path: &Utf8Path, e: std::io::Error) -> String {
    format!(
        "{} is not writable ({}). Check the volume mount.",
        path, e
    )
}

fn add_requirement(path: &Utf8Path, name: &str, version: Option<&str>) -> InstallOutcome {
    let spec = match version {
        Some(v) => format!("{}>={}", name, v),
        None => name.to_string(),
    };
    let version = version.unwrap_or_default();

    if let Err(e) = OpenOptions::new().append(true).open(path) {
        return InstallOutcome::failed(name, not_writable(path, e));
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return InstallOutcome::failed(name, e.to_string()),
    };

    let target = normalize_name(name);
    let existing = content
        .lines()
        .position(|line| requirement_name(line).is_some_and(|n| normalize_name(n) == target));

    let result = match existing {
        Some(index) => {
            let mut lines: Vec<&str> = content.lines().collect();
            let old = lines[index].trim().to_string();
            if old == spec {
                return InstallOutcome::ok(
                    name,
                    version,
                    format!("Package already in requirements: {}", spec),
                );
            }
            lines[index] = &spec;
            fs::write(path, lines.join("\n") + "\n")
                .map(|_| format!("Updated {} to {} in {}", old, spec, path))
        }
        None => {
            let mut line = String::new();
            if !content.is_empty() && !content.ends_with('\n') {
                line.push('\n');
            }
            line.push_str(&spec);
            line.push('\n');
            OpenOptions::new()
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(line.as_bytes()))
                .map(|_| format!("Added to {}: {}", path, spec))
        }
    };

    match result {
        Ok(message) => {
            info!("{}", message);
            InstallOutcome::ok(name, version, message)
        }
        Err(e) => {
            warn!("Failed to update {}: {}", path, e);
            InstallOutcome::failed(name, e.to_string())
        }
    }
}

fn remove_requirement(path: &Utf8Path, name: &str) -> InstallOutcome {
    if let Err(e) = OpenOptions::new().append(true).open(path) {
        return InstallOutcome::failed(name, not_writable(path, e));
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return InstallOutcome::failed(name, e.to_string()),
    };

    let target = normalize_name(name);
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| !requirement_name(line).is_some_and(|n| normalize_name(n) == target))
        .collect();

    if kept.len() == content.lines().count() {
        return InstallOutcome::ok(name, "", "Package not in requirements file.");
    }

    let mut updated = kept.join("\n");
    if !updated.is_empty() {
        updated.push('\n');
    }
    match fs::write(path, updated) {
        Ok(()) => {
            info!("Removed {} from {}", name, path);
            InstallOutcome::ok(name, "", format!("Removed from {}: {}", path, name))
        }
        Err(e) => InstallOutcome::failed(name, e.to_string()),
    }
}
