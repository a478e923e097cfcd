//! Immutable per-run configuration
//!
//! Built once from [`Settings`] and the command line, then shared read-only
//! by the resolver, installer and orchestrator.

use crate::settings::Settings;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a single update run
#[derive(Debug, Clone)]
pub struct RunConfig {
    parallel: usize,
    token: Option<String>,
    include: Vec<String>,
    exclude: Vec<String>,
    dry_run: bool,
    check_only: bool,
    assume_yes: bool,
    temp_dir: PathBuf,
    github_api_url: String,
    http_timeout: Duration,
    user_agent: String,
}

impl RunConfig {
    /// Start from resolved settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            parallel: settings.parallel,
            token: None,
            include: Vec::new(),
            exclude: Vec::new(),
            dry_run: false,
            check_only: false,
            assume_yes: false,
            temp_dir: settings.temp_dir.clone().unwrap_or_else(std::env::temp_dir),
            github_api_url: settings.github_api_url.trim_end_matches('/').to_string(),
            http_timeout: Duration::from_secs(settings.http_timeout_secs),
            user_agent: settings.user_agent.clone(),
        }
    }

    /// Set the number of parallel workers
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the provider access token; empty tokens are ignored
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Only process these binaries (empty means all)
    pub fn with_include(mut self, names: Vec<String>) -> Self {
        self.include = names;
        self
    }

    /// Never process these binaries
    pub fn with_exclude(mut self, names: Vec<String>) -> Self {
        self.exclude = names;
        self
    }

    /// Report what would be installed without installing
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Only check for updates
    pub fn with_check_only(mut self, check_only: bool) -> Self {
        self.check_only = check_only;
        self
    }

    /// Install without asking for confirmation
    pub fn with_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    /// Root of the per-binary download folders
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    /// GitHub REST API base URL
    pub fn with_github_api_url(mut self, url: impl Into<String>) -> Self {
        self.github_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Worker count, at least 1
    pub fn parallel(&self) -> usize {
        self.parallel.max(1)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn check_only(&self) -> bool {
        self.check_only
    }

    pub fn assume_yes(&self) -> bool {
        self.assume_yes
    }

    pub fn temp_dir(&self) -> &PathBuf {
        &self.temp_dir
    }

    pub fn github_api_url(&self) -> &str {
        &self.github_api_url
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Whether the include/exclude filters select this binary
    pub fn selects(&self, name: &str) -> bool {
        if self.exclude.iter().any(|n| n == name) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|n| n == name)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
