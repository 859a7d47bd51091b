//! Shared utility functions for Vitrine crates

use anyhow::anyhow;
use std::path::PathBuf;

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() because
/// container images often remap HOME while /etc/passwd keeps the original.
pub fn get_home_dir() -> anyhow::Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}

/// User agent sent with every HTTP request
pub fn user_agent() -> String {
    format!("vitrine/{}", env!("CARGO_PKG_VERSION"))
}
