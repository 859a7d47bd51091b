//! Installation attempt ledger
//!
//! Attempts are appended as JSON lines to `~/.vitrine/attempts.jsonl`
//! under an exclusive file lock. An attempt is written twice: once when it
//! starts and once when it completes. Reads fold lines by id, so the last
//! line for an id wins.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;
use vitrine_core::types::{InstallAction, InstallationAttempt};

/// Default number of attempts shown by history queries
pub const DEFAULT_HISTORY_LIMIT: usize = 25;

/// Filter for history queries
#[derive(Debug, Default, Clone)]
pub struct AttemptQuery {
    /// Only attempts for this package
    pub package: Option<String>,
    /// Maximum number of attempts, newest first
    pub limit: Option<usize>,
}

/// Append-only attempt ledger
pub struct AttemptLog {
    path: PathBuf,
}

impl AttemptLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start an attempt and write its in-progress record
    pub fn begin(
        &self,
        package_name: &str,
        version: &str,
        action: InstallAction,
        user: Option<String>,
    ) -> Result<InstallationAttempt> {
        let attempt = InstallationAttempt::begin(package_name, version, action, user);
        self.record(&attempt)?;
        Ok(attempt)
    }

    /// Append the current state of an attempt
    pub fn record(&self, attempt: &InstallationAttempt) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create attempt log directory")?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context("Failed to open attempt log")?;

        // Released when `file` is dropped
        file.lock_exclusive()
            .context("Failed to acquire exclusive lock on attempt log")?;

        let line = serde_json::to_string(attempt).context("Failed to serialize attempt")?;
        writeln!(file, "{}", line).context("Failed to write attempt")?;
        file.sync_all().context("Failed to sync attempt log")?;
        Ok(())
    }

    /// Latest state of every attempt matching `query`, newest first
    pub fn list(&self, query: &AttemptQuery) -> Result<Vec<InstallationAttempt>> {
        let mut attempts: Vec<InstallationAttempt> = self
            .fold()?
            .into_iter()
            .rev()
            .filter(|a| {
                query
                    .package
                    .as_deref()
                    .is_none_or(|package| a.package_name == package)
            })
            .collect();

        // Stable, so equal timestamps keep newest-written first
        attempts.sort_by(|a, b| b.started.cmp(&a.started));
        if let Some(limit) = query.limit {
            attempts.truncate(limit);
        }
        Ok(attempts)
    }

    /// Latest record per id, in order of first appearance
    fn fold(&self) -> Result<Vec<InstallationAttempt>> {
        let mut attempts: Vec<InstallationAttempt> = Vec::new();
        let mut positions: HashMap<Uuid, usize> = HashMap::new();
        if !self.path.exists() {
            return Ok(attempts);
        }

        let file = fs::File::open(&self.path).context("Failed to open attempt log")?;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.context("Failed to read line from attempt log")?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<InstallationAttempt>(&line) {
                Ok(attempt) => match positions.get(&attempt.id) {
                    Some(&position) => attempts[position] = attempt,
                    None => {
                        positions.insert(attempt.id, attempts.len());
                        attempts.push(attempt);
                    }
                },
                Err(e) => warn!("Skipping malformed attempt log line {}: {}", index + 1, e),
            }
        }
        Ok(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vitrine_core::types::AttemptStatus;

    fn log_in(dir: &TempDir) -> AttemptLog {
        AttemptLog::new(dir.path().join("nested").join("attempts.jsonl"))
    }

    #[test]
    fn test_updates_fold_by_id() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        let mut attempt = log
            .begin("netbox-bgp", "0.14.0", InstallAction::Install, None)
            .unwrap();
        attempt.complete(true, "0.14.1", "ok".to_string(), String::new());
        log.record(&attempt).unwrap();

        let all = log.list(&AttemptQuery::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, AttemptStatus::Success);
        assert_eq!(all[0].version, "0.14.1");

        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
    }

    #[test]
    fn test_package_filter_and_limit() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        log.begin("netbox-bgp", "1", InstallAction::Install, None).unwrap();
        log.begin("netbox-dns", "1", InstallAction::Install, None).unwrap();
        let newest = log
            .begin("netbox-bgp", "2", InstallAction::Upgrade, Some("admin".to_string()))
            .unwrap();

        let bgp = log
            .list(&AttemptQuery {
                package: Some("netbox-bgp".to_string()),
                limit: None,
            })
            .unwrap();
        assert_eq!(bgp.len(), 2);
        assert_eq!(bgp[0].id, newest.id);

        let limited = log
            .list(&AttemptQuery {
                package: None,
                limit: Some(1),
            })
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].user.as_deref(), Some("admin"));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        log.begin("netbox-bgp", "1", InstallAction::Install, None).unwrap();

        let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
        writeln!(file, "{{not json").unwrap();

        assert_eq!(log.list(&AttemptQuery::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(log_in(&dir).list(&AttemptQuery::default()).unwrap().is_empty());
    }
}
