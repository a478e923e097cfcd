//! Hierarchical runtime settings
//!
//! Settings are resolved with the following precedence (low to high):
//! 1. Built-in defaults
//! 2. Settings file (~/.binstall/config.yaml)
//! 3. Environment variables (BINSTALL_* prefix)
//! 4. CLI flags (applied by the caller through [`crate::RunConfig`])

use crate::error::{Error, Result};
use crate::utils::get_home_dir;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default number of parallel installs
pub const DEFAULT_PARALLEL: usize = 4;

/// Default GitHub REST API base URL
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Number of parallel workers
    pub parallel: usize,

    /// GitHub REST API base URL
    pub github_api_url: String,

    /// Timeout for each HTTP request in seconds
    pub http_timeout_secs: u64,

    /// User agent for HTTP requests
    pub user_agent: String,

    /// Root of the per-binary download folders (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parallel: DEFAULT_PARALLEL,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            temp_dir: None,
        }
    }
}

fn default_user_agent() -> String {
    format!(
        "binstall/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Settings file contents; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SettingsFile {
    parallel: Option<usize>,
    github_api_url: Option<String>,
    http_timeout_secs: Option<u64>,
    user_agent: Option<String>,
    temp_dir: Option<PathBuf>,
}

/// Loads [`Settings`] from defaults, the settings file and the environment
pub struct SettingsLoader {
    /// Directory holding config.yaml
    config_dir: PathBuf,
}

impl SettingsLoader {
    /// Create a loader for the standard config directory (~/.binstall)
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_dir: get_home_dir()?.join(".binstall"),
        })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Resolve settings with hierarchical precedence
    pub fn load(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        let path = self.config_dir.join("config.yaml");
        if path.exists() {
            debug!("Loading settings from {}", path.display());
            let content = fs::read_to_string(&path)?;
            let file: SettingsFile = serde_yaml_ng::from_str(&content).map_err(|e| {
                Error::invalid_config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            settings = Self::merge(settings, file);
        }

        Self::apply_env_overrides(settings)
    }

    fn merge(mut base: Settings, overlay: SettingsFile) -> Settings {
        if let Some(parallel) = overlay.parallel {
            base.parallel = parallel;
        }
        if let Some(url) = overlay.github_api_url {
            base.github_api_url = url;
        }
        if let Some(timeout) = overlay.http_timeout_secs {
            base.http_timeout_secs = timeout;
        }
        if let Some(agent) = overlay.user_agent {
            base.user_agent = agent;
        }
        if overlay.temp_dir.is_some() {
            base.temp_dir = overlay.temp_dir;
        }
        base
    }

    fn apply_env_overrides(mut settings: Settings) -> Result<Settings> {
        if let Ok(val) = env::var("BINSTALL_PARALLEL") {
            settings.parallel = val.parse().map_err(|_| {
                Error::invalid_config("BINSTALL_PARALLEL must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("BINSTALL_HTTP_TIMEOUT_SECS") {
            settings.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("BINSTALL_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("BINSTALL_GITHUB_API_URL") {
            settings.github_api_url = val;
        }

        if let Ok(val) = env::var("BINSTALL_TEMP_DIR") {
            settings.temp_dir = Some(PathBuf::from(val));
        }

        Ok(settings)
    }
}
