//! Release lookup and asset selection

use crate::error::{Error, Result};
use crate::platform::OsArch;
use async_trait::async_trait;
use binstall_core::{BinarySpec, RunConfig};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Asset extensions that never hold an installable binary
pub const IGNORED_EXTENSIONS: &[&str] = &["deb", "sig", "rpm", "pem", "sbom"];

/// Where a binary's releases are published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GitHub,
    Other,
}

impl Provider {
    /// Classify a source URL
    pub fn classify(url: &str) -> Self {
        if url.contains("github.com") {
            Self::GitHub
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitHub => write!(f, "github"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Owner and repository of a GitHub project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRepo {
    pub owner: String,
    pub repo: String,
}

impl GitHubRepo {
    /// Parse `https://github.com/<owner>/<repo>[.git][/...]`
    pub fn from_url(source: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSourceUrl {
            url: source.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(source).map_err(|e| invalid(&e.to_string()))?;
        let mut segments = parsed
            .path_segments()
            .ok_or_else(|| invalid("URL has no path"))?
            .filter(|s| !s.is_empty());

        let owner = segments.next().ok_or_else(|| invalid("missing owner"))?;
        let repo = segments.next().ok_or_else(|| invalid("missing repository"))?;
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if repo.is_empty() {
            return Err(invalid("missing repository"));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Release information
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v2.60.1")
    pub tag_name: String,

    /// Release assets, in provider order
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Release asset
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset name
    pub name: String,

    /// Declared media type
    #[serde(default)]
    pub content_type: String,

    /// Download URL
    pub browser_download_url: String,

    /// Asset size in bytes
    #[serde(default)]
    pub size: u64,
}

/// Source of latest-release metadata
#[async_trait]
pub trait ReleaseProvider: Send + Sync {
    async fn latest_release(&self, repo: &GitHubRepo) -> Result<Release>;
}

/// GitHub REST API client
pub struct GitHubProvider {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubProvider {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Build from the run configuration, sharing `client`
    pub fn from_config(client: reqwest::Client, config: &RunConfig) -> Self {
        Self::new(client, config.github_api_url())
            .with_token(config.token().map(str::to_string))
    }

    /// Authenticate requests with a bearer token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

#[async_trait]
impl ReleaseProvider for GitHubProvider {
    async fn latest_release(&self, repo: &GitHubRepo) -> Result<Release> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url, repo.owner, repo.repo
        );

        debug!("Fetching latest release from: {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::network(&url, e))?;

        if !response.status().is_success() {
            return Err(Error::network(
                &url,
                format!("Failed to fetch release: {}", response.status()),
            ));
        }

        response
            .json::<Release>()
            .await
            .map_err(|e| Error::network(&url, e))
    }
}

/// Whether an asset name ends in an ignored extension
fn has_ignored_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| IGNORED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// First asset built for `target`, skipping packages and signatures
pub fn select_asset<'a>(release: &'a Release, target: OsArch) -> Option<&'a ReleaseAsset> {
    release
        .assets
        .iter()
        .find(|asset| OsArch::infer(&asset.name) == target && !has_ignored_extension(&asset.name))
}

/// Latest release and the asset chosen for this platform
#[derive(Debug, Clone)]
pub struct ResolvedRelease {
    pub provider: Provider,
    pub tag: String,
    pub asset: ReleaseAsset,
}

/// Maps a binary spec to its latest installable asset
#[derive(Clone)]
pub struct ReleaseResolver {
    provider: Arc<dyn ReleaseProvider>,
    target: OsArch,
}

impl ReleaseResolver {
    /// Resolve for the current platform
    pub fn new(provider: Arc<dyn ReleaseProvider>) -> Self {
        Self {
            provider,
            target: OsArch::current(),
        }
    }

    /// Resolve for another platform
    pub fn with_target(mut self, target: OsArch) -> Self {
        self.target = target;
        self
    }

    pub fn target(&self) -> OsArch {
        self.target
    }

    /// Find the latest release asset for `spec`
    pub async fn resolve(&self, spec: &BinarySpec) -> Result<ResolvedRelease> {
        let provider = Provider::classify(&spec.url);
        if provider == Provider::Other {
            return Err(Error::ProviderUnsupported {
                url: spec.url.clone(),
            });
        }

        let repo = GitHubRepo::from_url(&spec.url)?;
        let release = self.provider.latest_release(&repo).await?;
        debug!(
            "{}: latest release {} has {} assets",
            repo,
            release.tag_name,
            release.assets.len()
        );

        let asset = select_asset(&release, self.target)
            .ok_or(Error::NoMatchingAsset {
                os_arch: self.target,
            })?
            .clone();
        debug!("{}: selected asset {}", repo, asset.name);

        Ok(ResolvedRelease {
            provider,
            tag: release.tag_name,
            asset,
        })
    }
}
