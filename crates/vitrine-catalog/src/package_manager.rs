//! Package manager seam
//!
//! [`PackageManager`] is the boundary to the host's installer. The pip
//! implementation runs every command as a subprocess bounded by a timeout;
//! failures come back as a [`CommandOutput`] with `success = false` rather
//! than as errors.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Timeout for `pip list`
const LIST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for `pip show`
const SHOW_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for probing a pip candidate with `--version`
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Captured result of a package-manager command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code; `None` when the process never ran or was killed
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A command that could not run at all
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: message.into(),
        }
    }
}

/// Host package manager
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Whether the package manager can be invoked at all
    async fn is_available(&self) -> bool;

    /// Installed packages as name → version
    async fn list_installed(&self) -> Result<BTreeMap<String, String>>;

    /// Installed version of one package
    async fn show_version(&self, name: &str) -> Option<String>;

    /// Install a `name[==version]` requirement
    async fn install(&self, spec: &str, upgrade: bool, timeout: Duration) -> CommandOutput;

    /// Remove a package without prompting
    async fn uninstall(&self, name: &str, timeout: Duration) -> CommandOutput;
}

/// Normalize a distribution name for comparison
///
/// Lowercase, with runs of `-`, `_` and `.` collapsed to a single `-`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('-');
            }
            in_separator = true;
        } else {
            normalized.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    normalized
}

/// Version from `pip show` output
pub fn parse_show_version(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Version:"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
struct ListedPackage {
    name: String,
    version: String,
}

/// Name → version map from `pip list --format=json` output
pub fn parse_list_output(stdout: &str) -> Result<BTreeMap<String, String>> {
    let packages: Vec<ListedPackage> =
        serde_json::from_str(stdout).context("Failed to parse pip list output")?;
    Ok(packages.into_iter().map(|p| (p.name, p.version)).collect())
}

/// pip driven through the host interpreter
pub struct PipPackageManager {
    python: String,
    command: OnceCell<Vec<String>>,
}

impl PipPackageManager {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            command: OnceCell::new(),
        }
    }

    /// Candidate pip invocations, most specific first
    fn candidates(&self) -> Vec<Vec<String>> {
        let mut candidates = Vec::new();

        if let Some(dir) = which::which(&self.python)
            .ok()
            .and_then(|p| p.parent().map(PathBuf::from))
        {
            for pip in ["pip", "pip3"] {
                let path = dir.join(pip);
                if path.exists() {
                    candidates.push(vec![path.to_string_lossy().into_owned()]);
                }
            }
        }

        candidates.push(vec![self.python.clone(), "-m".into(), "pip".into()]);

        for pip in ["pip", "pip3"] {
            if let Ok(path) = which::which(pip) {
                candidates.push(vec![path.to_string_lossy().into_owned()]);
            }
        }

        candidates
    }

    /// First candidate that answers `--version`; `python -m pip` otherwise
    async fn pip_command(&self) -> &[String] {
        self.command
            .get_or_init(|| async {
                for candidate in self.candidates() {
                    let output = run(&candidate, &["--version"], PROBE_TIMEOUT).await;
                    if output.success {
                        info!("Found working pip command: {}", candidate.join(" "));
                        return candidate;
                    }
                }
                debug!("No working pip found, defaulting to {} -m pip", self.python);
                vec![self.python.clone(), "-m".into(), "pip".into()]
            })
            .await
    }

    async fn pip(&self, args: &[&str], timeout: Duration) -> CommandOutput {
        let command = self.pip_command().await;
        run(command, args, timeout).await
    }
}

#[async_trait]
impl PackageManager for PipPackageManager {
    async fn is_available(&self) -> bool {
        self.pip(&["--version"], PROBE_TIMEOUT).await.success
    }

    async fn list_installed(&self) -> Result<BTreeMap<String, String>> {
        let output = self.pip(&["list", "--format=json"], LIST_TIMEOUT).await;
        if !output.success {
            return Err(anyhow!("pip list failed: {}", output.stderr.trim()));
        }
        parse_list_output(&output.stdout)
    }

    async fn show_version(&self, name: &str) -> Option<String> {
        let output = self.pip(&["show", name], SHOW_TIMEOUT).await;
        if !output.success {
            return None;
        }
        parse_show_version(&output.stdout)
    }

    async fn install(&self, spec: &str, upgrade: bool, timeout: Duration) -> CommandOutput {
        let mut args = vec!["install"];
        if upgrade {
            args.push("--upgrade");
        }
        args.push(spec);
        self.pip(&args, timeout).await
    }

    async fn uninstall(&self, name: &str, timeout: Duration) -> CommandOutput {
        self.pip(&["uninstall", "-y", name], timeout).await
    }
}

/// Run `command + args`, capturing output, killed after `timeout`
async fn run(command: &[String], args: &[&str], timeout: Duration) -> CommandOutput {
    let Some((program, base_args)) = command.split_first() else {
        return CommandOutput::failure("empty command");
    };

    info!("Running: {} {}", command.join(" "), args.join(" "));
    let mut cmd = Command::new(program);
    cmd.args(base_args).args(args).kill_on_drop(true);

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
        Ok(Err(e)) => CommandOutput::failure(format!("Failed to run {}: {}", program, e)),
        Err(_) => CommandOutput::failure(format!(
            "Command timed out after {} seconds",
            timeout.as_secs()
        )),
    }
}
