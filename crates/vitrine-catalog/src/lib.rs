//! # vitrine-catalog
//!
//! Catalog orchestration for Vitrine:
//! - `compatibility`: host-version verdicts from curated or declared bounds
//! - `curated`: curated catalog loading (remote, file override, bundled)
//! - `service`: the merged plugin view
//! - `package_manager` / `installer`: installs into a live environment or
//!   a requirements file
//! - `attempts` / `workflow`: audited install and uninstall
//! - `filter`: listing filters and ordering

pub mod attempts;
pub mod compatibility;
pub mod curated;
pub mod filter;
pub mod installer;
pub mod merge;
pub mod package_manager;
pub mod service;
pub mod workflow;

pub use attempts::{AttemptLog, AttemptQuery};
pub use compatibility::{
    CompatibilityChecker, ConstraintProbe, DeclaredConstraints, PostInstallReport,
    PostInstallStatus, PythonProbe, Resolution,
};
pub use curated::{bundled_catalog, CuratedLoader};
pub use filter::{CompatibilityFilter, PluginFilter, StatusFilter};
pub use installer::{InstallEnvironment, InstallOutcome, PluginInstaller};
pub use package_manager::{CommandOutput, PackageManager, PipPackageManager};
pub use service::{CatalogDeps, CatalogService};
pub use workflow::{InstallWorkflow, WorkflowReport};
