//! Fake process execution
//!
//! Fake binaries are files whose content is the output they "print". The
//! runner reads an existing file instead of spawning it, resolves bare names
//! against a configured search path, and reports everything else as not
//! found.

use async_trait::async_trait;
use binstall_update::{CommandRunner, ProbeError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// ELF-looking file content that reports `version`
pub fn fake_binary(version: &str) -> Vec<u8> {
    let mut content = b"\x7fELF\x02\x01\x01\x00".to_vec();
    content.extend_from_slice(format!("\ntool version {}\n", version).as_bytes());
    content
}

#[derive(Debug, Default)]
pub struct FakeRunner {
    search_path: HashMap<String, String>,
    failing: Vec<String>,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a bare program name resolvable, printing `output`
    pub fn on_path(mut self, name: &str, output: &str) -> Self {
        self.search_path.insert(name.to_string(), output.to_string());
        self
    }

    /// Make a bare program name exit with an error
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    /// Programs run so far
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, program: &Path, _args: &[String]) -> Result<String, ProbeError> {
        self.calls.lock().unwrap().push(program.to_path_buf());
        let name = program.display().to_string();

        if self.failing.contains(&name) {
            return Err(ProbeError::Failed {
                program: name,
                message: "exit code 1".to_string(),
            });
        }

        if program.is_file() {
            let content = std::fs::read(program).map_err(|e| ProbeError::Failed {
                program: name.clone(),
                message: e.to_string(),
            })?;
            return Ok(String::from_utf8_lossy(&content).into_owned());
        }

        self.search_path
            .get(&name)
            .cloned()
            .ok_or(ProbeError::NotFound { program: name })
    }
}
