//! Common test infrastructure for vitrine-catalog tests
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! - `fakes`: in-memory package manager and constraint probe
//! - `fixtures`: registry and curated catalog bodies
//! - `mock_server`: wiremock setup and service construction

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fakes;
pub mod fixtures;
pub mod mock_server;

pub use fakes::*;
pub use fixtures::*;
pub use mock_server::*;
