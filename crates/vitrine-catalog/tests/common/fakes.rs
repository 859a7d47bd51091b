//! In-memory stand-ins for the host package manager and constraint probe

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use vitrine_catalog::{CommandOutput, ConstraintProbe, DeclaredConstraints, PackageManager};

/// Package manager backed by a map
pub struct FakePackageManager {
    pub installed: Mutex<BTreeMap<String, String>>,
    pub available: bool,
    pub fail_install: bool,
    pub fail_list: bool,
    pub list_calls: AtomicUsize,
    pub commands: Mutex<Vec<String>>,
}

impl FakePackageManager {
    pub fn new() -> Self {
        Self {
            installed: Mutex::new(BTreeMap::new()),
            available: true,
            fail_install: false,
            fail_list: false,
            list_calls: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn with_installed(self, name: &str, version: &str) -> Self {
        self.installed
            .lock()
            .unwrap()
            .insert(name.to_string(), version.to_string());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageManager for FakePackageManager {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn list_installed(&self) -> Result<BTreeMap<String, String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(anyhow!("pip list failed"));
        }
        Ok(self.installed.lock().unwrap().clone())
    }

    async fn show_version(&self, name: &str) -> Option<String> {
        self.installed.lock().unwrap().get(name).cloned()
    }

    async fn install(&self, spec: &str, upgrade: bool, _timeout: Duration) -> CommandOutput {
        let command = if upgrade {
            format!("install --upgrade {}", spec)
        } else {
            format!("install {}", spec)
        };
        self.commands.lock().unwrap().push(command);

        if self.fail_install {
            return CommandOutput {
                success: false,
                exit_code: Some(1),
                stdout: String::new(),
                stderr: "ERROR: No matching distribution found".to_string(),
            };
        }

        let (name, version) = spec.split_once("==").unwrap_or((spec, "9.9.9"));
        self.installed
            .lock()
            .unwrap()
            .insert(name.to_string(), version.to_string());
        CommandOutput {
            success: true,
            exit_code: Some(0),
            stdout: format!("Successfully installed {}-{}", name, version),
            stderr: String::new(),
        }
    }

    async fn uninstall(&self, name: &str, _timeout: Duration) -> CommandOutput {
        self.commands.lock().unwrap().push(format!("uninstall -y {}", name));
        let removed = self.installed.lock().unwrap().remove(name).is_some();
        CommandOutput {
            success: removed,
            exit_code: Some(if removed { 0 } else { 1 }),
            stdout: if removed {
                format!("Successfully uninstalled {}", name)
            } else {
                String::new()
            },
            stderr: if removed {
                String::new()
            } else {
                format!("WARNING: Skipping {} as it is not installed.", name)
            },
        }
    }
}

/// Probe answering from a fixed table
#[derive(Default)]
pub struct FakeProbe {
    pub declared: HashMap<String, DeclaredConstraints>,
    pub calls: AtomicUsize,
}

impl FakeProbe {
    pub fn declaring(mut self, package: &str, min: Option<&str>, max: Option<&str>) -> Self {
        self.declared.insert(
            package.to_string(),
            DeclaredConstraints {
                min_version: min.map(String::from),
                max_version: max.map(String::from),
                name: Some(package.replace('-', "_")),
                version: None,
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConstraintProbe for FakeProbe {
    async fn probe(&self, package_name: &str) -> Option<DeclaredConstraints> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.declared.get(package_name).cloned()
    }
}
