//! Common test infrastructure for binstall-update tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Repository names, tags, asset names, version patterns
//! - `builders`: Fluent builders for specs, release JSON and plans
//! - `mock_server`: Wiremock setup helpers for the GitHub API and asset hosting
//! - `fake_runner`: A `CommandRunner` that "executes" files by reading them

// Not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod fake_runner;
pub mod mock_server;

pub use builders::*;
pub use constants::*;
pub use fake_runner::*;
pub use mock_server::*;
