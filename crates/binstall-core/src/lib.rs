//! # binstall-core
//!
//! Core library for binstall providing:
//! - Binary spec types (`BinarySpec`, `FileDescriptor`, checksum descriptors)
//! - Spec loading from a directory of YAML files
//! - Hierarchical runtime settings and the immutable per-run configuration

pub mod error;
pub mod loader;
pub mod run_config;
pub mod settings;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use loader::{load_spec_file, SpecSet};
pub use run_config::RunConfig;
pub use settings::{Settings, SettingsLoader};
pub use types::{BinarySpec, ChecksumSpec, FileDescriptor, ShaType, VersionCommand};
pub use utils::{expand_home, get_home_dir};
