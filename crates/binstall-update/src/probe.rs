//! Version probing of local executables
//!
//! Process execution sits behind [`CommandRunner`] so the pipeline can be
//! driven by a fake in tests; [`ProcessRunner`] is the real implementation.

use crate::error::{Error, Result};
use async_trait::async_trait;
use binstall_core::FileDescriptor;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Why a command could not produce output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The program could not be located or started
    #[error("{program} not found")]
    NotFound { program: String },

    /// The program started but failed
    #[error("failed to execute {program}: {message}")]
    Failed { program: String, message: String },
}

impl From<ProbeError> for Error {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::NotFound { program } => Error::VersionProbeNotFound { program },
            ProbeError::Failed { program, message } => Error::Probe { program, message },
        }
    }
}

/// Capability to run a program and capture its combined output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, returning stdout followed by stderr
    async fn run(&self, program: &Path, args: &[String]) -> std::result::Result<String, ProbeError>;
}

/// Runs real processes with tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &Path, args: &[String]) -> std::result::Result<String, ProbeError> {
        let program_name = program.display().to_string();
        debug!("Running {} {:?}", program_name, args);

        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::NotFound {
                        program: program_name.clone(),
                    }
                } else {
                    ProbeError::Failed {
                        program: program_name.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(ProbeError::Failed {
                program: program_name,
                message: format!(
                    "exit code {}\nOutput: {}",
                    output.status.code().unwrap_or(-1),
                    combined.trim()
                ),
            });
        }

        Ok(combined)
    }
}

/// Extract a version token from command output
///
/// Takes the first match of `pattern`. A match such as `tool v1.2.3`
/// yields its second whitespace-separated field; a single-field match is
/// used as is. No match yields an empty string.
pub fn extract_version(output: &str, pattern: &str) -> Result<String> {
    let re = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let Some(found) = re.find(output) else {
        return Ok(String::new());
    };

    let fields: Vec<&str> = found.as_str().split_whitespace().collect();
    Ok(match fields.as_slice() {
        [] => String::new(),
        [single] => (*single).to_string(),
        [_, second, ..] => (*second).to_string(),
    })
}

/// Runs a file's version command and extracts its version
#[derive(Clone)]
pub struct VersionProbe {
    runner: Arc<dyn CommandRunner>,
}

impl VersionProbe {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Probe with real processes
    pub fn process() -> Self {
        Self::new(Arc::new(ProcessRunner))
    }

    /// Run `program` with the file's version arguments and return the raw output
    pub async fn run(&self, program: &Path, file: &FileDescriptor) -> Result<String> {
        Ok(self
            .runner
            .run(program, &file.version_command.args)
            .await?)
    }

    /// Run `program` and extract its version with the file's pattern
    pub async fn probe(&self, program: &Path, file: &FileDescriptor) -> Result<String> {
        let output = self.run(program, file).await?;
        let version = extract_version(&output, &file.version_command.regex_version)?;
        debug!("{} reports version '{}'", program.display(), version);
        Ok(version)
    }

    /// Program to probe for the installed copy of `file`
    ///
    /// The destination in `install_dir` when it exists, otherwise the bare
    /// destination name so the search path is consulted.
    pub fn installed_program(install_dir: &Path, file: &FileDescriptor) -> PathBuf {
        let installed = install_dir.join(file.destination_name());
        if installed.exists() {
            installed
        } else {
            PathBuf::from(file.destination_name())
        }
    }
}
