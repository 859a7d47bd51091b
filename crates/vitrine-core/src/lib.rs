//! # vitrine-core
//!
//! Core library for the Vitrine plugin catalog providing:
//! - Configuration loading (embedded defaults, config.yaml, VITRINE_* overrides)
//! - Tolerant version parsing and comparison
//! - The keyed TTL cache shared by registry and catalog components
//! - Type definitions for packages, curated entries, plugin records and
//!   installation attempts

pub mod cache;
pub mod config;
pub mod error;
pub mod types;
pub mod utils;
pub mod version;

pub use cache::TtlCache;
pub use config::ConfigLoader;
pub use error::{Error, Result};
pub use utils::get_home_dir;
pub use version::Version;

/// Crate version, used in the HTTP user agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
