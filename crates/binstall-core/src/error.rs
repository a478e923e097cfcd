//! Error types for binstall-core

use thiserror::Error;

/// Result type alias using binstall-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading binary specs and runtime settings
#[derive(Error, Debug)]
pub enum Error {
    /// Spec directory does not exist or is not a directory
    #[error("Spec directory not found: {path}")]
    SpecDirNotFound { path: String },

    /// A spec file could not be read
    #[error("Error reading file {path}: {source}")]
    ReadSpec {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A spec file is not valid YAML for a binary spec
    #[error("Error parsing YAML from file {path}: {source}")]
    ParseSpec {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// A spec parsed but failed validation
    #[error("Invalid binary spec in {path}: {message}")]
    InvalidSpec { path: String, message: String },

    /// Two spec files declare the same binary name
    #[error("Duplicate binary name '{name}' in {path}")]
    DuplicateName { name: String, path: String },

    /// Invalid runtime configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Home directory could not be determined
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Glob pattern error
    #[error("Failed to glob spec files: {0}")]
    Glob(#[from] glob::PatternError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid spec error
    pub fn invalid_spec(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
