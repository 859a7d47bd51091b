//! # vitrine-registry
//!
//! Read-only client for the package index:
//! - discovers plugin packages by name prefix on the simple index
//! - fetches and normalizes per-package metadata
//! - caches both in the shared `TtlCache`

pub mod client;
pub mod pypi;

pub use client::{package_key, RegistryClient, PACKAGES_KEY, PACKAGE_KEY_PREFIX};
pub use pypi::author_from_email;
