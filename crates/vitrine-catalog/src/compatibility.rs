//! Host-version compatibility resolution
//!
//! Bounds come from one of three places, in order of precedence:
//!
//! 1. The curated catalog (`netbox_min_version` / `netbox_max_version`)
//! 2. Constraints declared by an installed copy of the package
//! 3. Nothing known, in which case the package is assumed compatible
//!
//! Curator judgment wins over the package's own declaration, which may be
//! stale. Malformed or empty bounds are ignored rather than reported.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};
use vitrine_core::types::{module_name, non_empty, CompatSource, CuratedEntry, Verdict};
use vitrine_core::Version;

/// Timeout for one constraint probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads the module's `config` entry point and prints its bounds as JSON.
/// Exit code 3 means the module is not importable, 4 means no entry point.
const PROBE_SCRIPT: &str = r#"
import importlib, json, sys
try:
    module = importlib.import_module(sys.argv[1])
except Exception:
    sys.exit(3)
config = getattr(module, "config", None)
if config is None:
    sys.exit(4)
def field(name):
    value = getattr(config, name, None)
    return None if value is None else str(value)
print(json.dumps({k: field(k) for k in ("min_version", "max_version", "name", "version")}))
"#;

/// Compatibility bounds a package declares about itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredConstraints {
    #[serde(default)]
    pub min_version: Option<String>,
    #[serde(default)]
    pub max_version: Option<String>,
    /// Declared plugin name
    #[serde(default)]
    pub name: Option<String>,
    /// Declared plugin version
    #[serde(default)]
    pub version: Option<String>,
}

impl DeclaredConstraints {
    pub fn has_bounds(&self) -> bool {
        non_empty(&self.min_version).is_some() || non_empty(&self.max_version).is_some()
    }
}

/// Source of declared constraints for installed packages
#[async_trait]
pub trait ConstraintProbe: Send + Sync {
    /// Declared constraints of an installed package
    ///
    /// `None` when the package is not installed or exposes no entry point.
    async fn probe(&self, package_name: &str) -> Option<DeclaredConstraints>;
}

/// Probe that asks the host interpreter to import the package
pub struct PythonProbe {
    python: String,
    timeout: Duration,
}

impl PythonProbe {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            timeout: PROBE_TIMEOUT,
        }
    }
}

#[async_trait]
impl ConstraintProbe for PythonProbe {
    async fn probe(&self, package_name: &str) -> Option<DeclaredConstraints> {
        let module = module_name(package_name);
        let mut command = Command::new(&self.python);
        command.args(["-c", PROBE_SCRIPT, &module]).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("Failed to run {} for {}: {}", self.python, package_name, e);
                return None;
            }
            Err(_) => {
                warn!("Constraint probe for {} timed out", package_name);
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                "No declared constraints for {} (exit {:?})",
                package_name,
                output.status.code()
            );
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match serde_json::from_str(stdout.trim()) {
            Ok(constraints) => Some(constraints),
            Err(e) => {
                warn!("Malformed constraints for {}: {}", package_name, e);
                None
            }
        }
    }
}

/// Verdict together with where its bounds came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub verdict: Verdict,
    pub source: CompatSource,
    pub min_version: Option<String>,
    pub max_version: Option<String>,
}

/// Outcome of re-checking a package after installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostInstallStatus {
    Ok,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostInstallReport {
    pub status: PostInstallStatus,
    pub message: String,
    pub constraints: Option<DeclaredConstraints>,
}

/// Check `current` against optional bounds
///
/// The lower bound is checked first. Empty or unparseable bounds are
/// treated as absent.
pub fn check_bounds(current: &Version, min: Option<&str>, max: Option<&str>) -> Verdict {
    if let Some(min) = min.filter(|m| !m.trim().is_empty()) {
        match Version::try_parse(min) {
            Some(bound) if *current < bound => {
                return Verdict::incompatible(format!("Requires NetBox >= {}", min));
            }
            Some(_) => {}
            None => debug!("Ignoring malformed minimum version '{}'", min),
        }
    }

    if let Some(max) = max.filter(|m| !m.trim().is_empty()) {
        match Version::try_parse(max) {
            Some(bound) if *current > bound => {
                return Verdict::incompatible(format!("Requires NetBox <= {}", max));
            }
            Some(_) => {}
            None => debug!("Ignoring malformed maximum version '{}'", max),
        }
    }

    Verdict::compatible()
}

/// Compatibility checker bound to the running host version
pub struct CompatibilityChecker {
    host_version: Version,
    probe: Arc<dyn ConstraintProbe>,
}

impl CompatibilityChecker {
    /// Create a checker for the host version string
    ///
    /// Vendor suffixes are tolerated; an unparseable version becomes `0.0.0`.
    pub fn new(host_version: &str, probe: Arc<dyn ConstraintProbe>) -> Self {
        Self {
            host_version: Version::parse(host_version),
            probe,
        }
    }

    pub fn host_version(&self) -> &Version {
        &self.host_version
    }

    /// Check the host version against optional bounds
    pub fn check(&self, min: Option<&str>, max: Option<&str>) -> Verdict {
        check_bounds(&self.host_version, min, max)
    }

    /// Constraints declared by an installed copy of the package
    pub async fn declared_constraints(&self, package_name: &str) -> Option<DeclaredConstraints> {
        self.probe.probe(package_name).await
    }

    /// Resolve compatibility from curated data, then declared constraints
    pub async fn resolve(&self, package_name: &str, curated: Option<&CuratedEntry>) -> Resolution {
        if curated.is_some_and(CuratedEntry::has_bounds) {
            return self.resolve_from(curated, None);
        }
        let declared = self.declared_constraints(package_name).await;
        self.resolve_from(curated, declared.as_ref())
    }

    /// Resolve from already-known sources without probing
    pub fn resolve_from(
        &self,
        curated: Option<&CuratedEntry>,
        declared: Option<&DeclaredConstraints>,
    ) -> Resolution {
        let (min, max, source) = match (curated, declared) {
            (Some(entry), _) if entry.has_bounds() => (
                non_empty(&entry.min_version),
                non_empty(&entry.max_version),
                CompatSource::Curated,
            ),
            (_, Some(declared)) if declared.has_bounds() => (
                non_empty(&declared.min_version),
                non_empty(&declared.max_version),
                CompatSource::PluginDeclared,
            ),
            _ => {
                return Resolution {
                    verdict: Verdict::compatible(),
                    source: CompatSource::Unknown,
                    min_version: None,
                    max_version: None,
                }
            }
        };

        Resolution {
            verdict: self.check(min, max),
            source,
            min_version: min.map(String::from),
            max_version: max.map(String::from),
        }
    }

    /// Re-check a freshly installed package against its own declaration
    ///
    /// Declared incompatibility is reported as a warning, never a failure.
    pub async fn verify_post_install(&self, package_name: &str) -> PostInstallReport {
        let constraints = self.declared_constraints(package_name).await;

        if let Some(declared) = &constraints {
            let verdict = self.check(
                non_empty(&declared.min_version),
                non_empty(&declared.max_version),
            );
            if !verdict.compatible {
                let reason = verdict.reason.unwrap_or_default();
                warn!("{} installed but declares: {}", package_name, reason);
                return PostInstallReport {
                    status: PostInstallStatus::Warning,
                    message: format!("Plugin installed but may not be compatible: {}", reason),
                    constraints,
                };
            }
        }

        PostInstallReport {
            status: PostInstallStatus::Ok,
            message: "Plugin installed successfully".to_string(),
            constraints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe(Option<DeclaredConstraints>);

    #[async_trait]
    impl ConstraintProbe for FixedProbe {
        async fn probe(&self, _package_name: &str) -> Option<DeclaredConstraints> {
            self.0.clone()
        }
    }

    fn declared(min: Option<&str>, max: Option<&str>) -> DeclaredConstraints {
        DeclaredConstraints {
            min_version: min.map(String::from),
            max_version: max.map(String::from),
            name: Some("netbox_x".to_string()),
            version: Some("1.0".to_string()),
        }
    }

    fn checker(host: &str, probe: Option<DeclaredConstraints>) -> CompatibilityChecker {
        CompatibilityChecker::new(host, Arc::new(FixedProbe(probe)))
    }

    #[test]
    fn test_check_bounds() {
        let v = |s| Version::parse(s);

        assert!(check_bounds(&v("4.2.0"), Some("4.0.0"), None).compatible);

        let below = check_bounds(&v("3.9.0"), Some("4.0.0"), None);
        assert!(!below.compatible);
        assert!(below.reason.unwrap().contains("4.0.0"));

        let above = check_bounds(&v("5.0.0"), None, Some("4.5.0"));
        assert!(!above.compatible);
        assert_eq!(above.reason.as_deref(), Some("Requires NetBox <= 4.5.0"));
    }

    #[test]
    fn test_malformed_and_empty_bounds_are_ignored() {
        let current = Version::parse("4.2.0");
        assert!(check_bounds(&current, Some("not-a-version"), Some("")).compatible);
        assert!(check_bounds(&current, Some(""), Some("garbage")).compatible);
    }

    #[test]
    fn test_vendor_suffixed_host() {
        let checker = checker("4.5.1-Docker-3.4.2", None);
        assert_eq!(checker.host_version(), &Version::new(4, 5, 1));
        assert!(checker.check(Some("4.5"), Some("4.5.1")).compatible);
    }

    #[tokio::test]
    async fn test_curated_bounds_take_precedence() {
        let checker = checker("3.5.0", Some(declared(Some("3.0"), None)));
        let curated = CuratedEntry {
            min_version: Some("4.0".to_string()),
            ..CuratedEntry::default()
        };

        let resolution = checker.resolve("netbox-x", Some(&curated)).await;
        assert_eq!(resolution.source, CompatSource::Curated);
        assert_eq!(resolution.min_version.as_deref(), Some("4.0"));
        assert!(!resolution.verdict.compatible);
    }

    #[tokio::test]
    async fn test_declared_bounds_without_curated_bounds() {
        let checker = checker("4.1.0", Some(declared(None, Some("4.0.99"))));
        let curated = CuratedEntry {
            category: Some("Routing".to_string()),
            ..CuratedEntry::default()
        };

        let resolution = checker.resolve("netbox-x", Some(&curated)).await;
        assert_eq!(resolution.source, CompatSource::PluginDeclared);
        assert!(!resolution.verdict.compatible);
    }

    #[tokio::test]
    async fn test_unknown_when_nothing_declared() {
        let checker = checker("4.1.0", Some(declared(None, None)));
        let resolution = checker.resolve("netbox-x", None).await;
        assert_eq!(resolution.source, CompatSource::Unknown);
        assert!(resolution.verdict.compatible);
        assert!(resolution.verdict.reason.is_none());
    }

    #[tokio::test]
    async fn test_verify_post_install() {
        let warn = checker("4.0.0", Some(declared(Some("4.2.0"), None)))
            .verify_post_install("netbox-x")
            .await;
        assert_eq!(warn.status, PostInstallStatus::Warning);
        assert!(warn.message.contains("Requires NetBox >= 4.2.0"));

        let ok = checker("4.0.0", None).verify_post_install("netbox-x").await;
        assert_eq!(ok.status, PostInstallStatus::Ok);
        assert!(ok.constraints.is_none());
    }

    #[test]
    fn test_declared_constraints_from_probe_output() {
        let parsed: DeclaredConstraints = serde_json::from_str(
            r#"{"min_version": "4.0.0", "max_version": null, "name": "netbox_bgp", "version": "0.14.0"}"#,
        )
        .unwrap();
        assert!(parsed.has_bounds());
        assert_eq!(parsed.name.as_deref(), Some("netbox_bgp"));
    }
}
