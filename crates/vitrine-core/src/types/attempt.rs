//! Installation attempt records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Package-manager action being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallAction {
    Install,
    Upgrade,
    Uninstall,
}

impl fmt::Display for InstallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InstallAction::Install => "install",
            InstallAction::Upgrade => "upgrade",
            InstallAction::Uninstall => "uninstall",
        };
        f.write_str(label)
    }
}

/// Lifecycle of an attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    #[default]
    Pending,
    InProgress,
    Success,
    Failed,
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttemptStatus::Pending => "pending",
            AttemptStatus::InProgress => "in_progress",
            AttemptStatus::Success => "success",
            AttemptStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One install, upgrade or uninstall attempt
///
/// Created before the package manager runs and updated once afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationAttempt {
    pub id: Uuid,
    pub package_name: String,
    /// Version installed or attempted
    pub version: String,
    pub action: InstallAction,
    pub status: AttemptStatus,
    /// Captured stdout of the package manager
    #[serde(default)]
    pub output: String,
    /// Captured stderr or failure message
    #[serde(default)]
    pub error: String,
    /// Who initiated the attempt
    #[serde(default)]
    pub user: Option<String>,
    pub started: DateTime<Utc>,
    #[serde(default)]
    pub completed: Option<DateTime<Utc>>,
}

impl InstallationAttempt {
    /// New attempt in the `in_progress` state
    pub fn begin(
        package_name: impl Into<String>,
        version: impl Into<String>,
        action: InstallAction,
        user: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            package_name: package_name.into(),
            version: version.into(),
            action,
            status: AttemptStatus::InProgress,
            output: String::new(),
            error: String::new(),
            user,
            started: Utc::now(),
            completed: None,
        }
    }

    /// Record the outcome; an empty `version` keeps the attempted one
    pub fn complete(&mut self, success: bool, version: &str, output: String, error: String) {
        self.status = if success {
            AttemptStatus::Success
        } else {
            AttemptStatus::Failed
        };
        if !version.is_empty() {
            self.version = version.to_string();
        }
        self.output = output;
        self.error = error;
        self.completed = Some(Utc::now());
    }
}

impl fmt::Display for InstallationAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.action, self.package_name, self.status)
    }
}
