//! Type definitions for the plugin catalog

mod attempt;
mod config_types;
mod curated;
mod package;
mod plugin;

pub use attempt::*;
pub use config_types::*;
pub use curated::*;
pub use package::*;
pub use plugin::*;
