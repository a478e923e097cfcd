//! Error types for the update pipeline

use crate::pipeline::Stage;
use crate::platform::OsArch;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Result type alias using binstall-update's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while checking or installing one binary
#[derive(Error, Debug)]
pub enum Error {
    /// The local executable could not be located or started
    #[error("{program} not found")]
    VersionProbeNotFound { program: String },

    /// The version command ran but failed
    #[error("Failed to execute {program}: {message}")]
    Probe { program: String, message: String },

    /// The version pattern does not compile
    #[error("Failed to compile the regex '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No release asset fits the platform and extension predicate
    #[error("No binary found for {os_arch}")]
    NoMatchingAsset { os_arch: OsArch },

    /// The source URL does not belong to a supported provider
    #[error("Unsupported release provider for {url}")]
    ProviderUnsupported { url: String },

    /// The source URL cannot be mapped to owner/repo
    #[error("Invalid source URL {url}: {reason}")]
    InvalidSourceUrl { url: String, reason: String },

    /// Transport or API failure
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Computed digest differs from the expected one
    #[error("Checksums do not match for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    /// A checksum manifest is configured without a digest type
    #[error("No sha type provided for checksum manifest {url}")]
    ChecksumTypeMissing { url: String },

    /// The checksum manifest has no entry for the downloaded file
    #[error("No checksum entry for {file} in {url}")]
    ChecksumEntryNotFound { file: String, url: String },

    /// The download is neither an executable nor an allowed archive
    #[error("Unsupported archive format '{media_type}' for {file}")]
    UnsupportedArchiveFormat { file: String, media_type: String },

    /// Archive extraction failed
    #[error("Failed to uncompress {path}: {message}")]
    Extraction { path: String, message: String },

    /// A file expected in the download folder is missing
    #[error("Source file does not exist: {path}")]
    SourceMissing { path: String },

    /// Moving a file into the install location failed
    #[error("Failed to move file from {from} to {to}: {source}")]
    MoveFailure {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },

    /// A moved file is not present at its destination
    #[error("File was not successfully moved to {path}")]
    NotInstalled { path: String },

    /// The installed binary reports a different version than the release
    #[error("Version mismatch for {file}. Installed: {installed}, Expected: {expected}")]
    PostInstallVersionMismatch {
        file: String,
        installed: String,
        expected: String,
    },

    /// A version string is not a semantic version
    #[error("Error parsing the {kind} version '{version}' for {name}: {source}")]
    VersionParse {
        name: String,
        kind: VersionKind,
        version: String,
        #[source]
        source: semver::Error,
    },

    /// The worker running this binary stopped without reporting
    #[error("Worker aborted: {message}")]
    Aborted { message: String },

    /// Spec-level configuration problem
    #[error(transparent)]
    Config(#[from] binstall_core::Error),

    /// IO error with context
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a network error from any displayable cause
    pub fn network(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error whose context names a path
    pub fn io_at(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::io(format!("Failed to {} {}", action, path.display()), source)
    }

    /// Whether this condition only changes control flow
    pub fn is_non_fatal(&self) -> bool {
        matches!(
            self,
            Self::VersionProbeNotFound { .. } | Self::NoMatchingAsset { .. }
        )
    }
}

/// Which side of a version comparison failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    Current,
    New,
    Installed,
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::New => write!(f, "new"),
            Self::Installed => write!(f, "installed"),
        }
    }
}

/// A fatal error attributed to one binary
#[derive(Error, Debug)]
#[error("failed to update {name} ({stage}): {error}")]
pub struct BinaryFailure {
    /// Binary name
    pub name: String,

    /// Stage in which the pipeline errored
    pub stage: Stage,

    /// The underlying error
    #[source]
    pub error: Error,
}

impl BinaryFailure {
    pub fn new(name: impl Into<String>, stage: Stage, error: Error) -> Self {
        Self {
            name: name.into(),
            stage,
            error,
        }
    }
}
