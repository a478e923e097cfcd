//! Version information for the binstall CLI

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Semantic version
    pub version: String,

    /// Platform this build targets, as `os/arch`
    pub platform: String,

    /// Git commit SHA (short), when provided at build time
    pub commit: Option<String>,
}

impl VersionInfo {
    /// Create version info for current build
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: binstall_update::OsArch::current().to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
        }
    }

    /// Format as display string
    pub fn display(&self) -> String {
        match &self.commit {
            Some(commit) => format!("binstall {} ({}) {}", self.version, commit, self.platform),
            None => format!("binstall {} {}", self.version, self.platform),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
