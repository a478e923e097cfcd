//! Builder patterns for test data construction

use binstall_core::{BinarySpec, ChecksumSpec, FileDescriptor, ShaType, VersionCommand};
use binstall_update::{
    Downloader, GitHubProvider, Provider, ReleaseResolver, Stage, UpdatePipeline, UpdatePlan,
    VersionProbe,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wiremock::MockServer;

use super::constants::*;
use super::fake_runner::FakeRunner;

/// Builder for latest-release JSON bodies
#[derive(Debug, Clone)]
pub struct ReleaseBuilder {
    tag_name: String,
    assets: Vec<Value>,
}

impl ReleaseBuilder {
    pub fn new() -> Self {
        Self {
            tag_name: TAG_V1_2_0.to_string(),
            assets: Vec::new(),
        }
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag_name = tag.to_string();
        self
    }

    pub fn asset(mut self, name: &str, content_type: &str, url: &str) -> Self {
        self.assets.push(json!({
            "name": name,
            "content_type": content_type,
            "browser_download_url": url,
            "size": 0
        }));
        self
    }

    pub fn build(self) -> Value {
        json!({
            "tag_name": self.tag_name,
            "name": format!("Release {}", self.tag_name),
            "draft": false,
            "prerelease": false,
            "assets": self.assets
        })
    }
}

impl Default for ReleaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for file descriptors
#[derive(Debug, Clone)]
pub struct FileBuilder {
    file: FileDescriptor,
}

impl FileBuilder {
    /// A copied, version-checked file
    pub fn new(file_name: &str) -> Self {
        Self {
            file: FileDescriptor {
                file_name: file_name.to_string(),
                source_path: None,
                rename_to: None,
                copy_it: true,
                check_version: true,
                execute_when_copying: false,
                version_command: VersionCommand {
                    args: vec!["--version".to_string()],
                    regex_version: VERSION_REGEX.to_string(),
                },
            },
        }
    }

    pub fn source_path(mut self, path: &str) -> Self {
        self.file.source_path = Some(path.to_string());
        self
    }

    pub fn rename_to(mut self, name: &str) -> Self {
        self.file.rename_to = Some(name.to_string());
        self
    }

    pub fn regex(mut self, pattern: &str) -> Self {
        self.file.version_command.regex_version = pattern.to_string();
        self
    }

    pub fn unchecked(mut self) -> Self {
        self.file.check_version = false;
        self
    }

    pub fn execute_when_copying(mut self) -> Self {
        self.file.execute_when_copying = true;
        self
    }

    pub fn build(self) -> FileDescriptor {
        self.file
    }
}

/// Builder for binary specs
#[derive(Debug, Clone)]
pub struct SpecBuilder {
    spec: BinarySpec,
}

impl SpecBuilder {
    pub fn new(install_location: &Path) -> Self {
        Self {
            spec: BinarySpec {
                name: BINARY_NAME.to_string(),
                url: SOURCE_URL.to_string(),
                install_location: install_location.display().to_string(),
                ignore: false,
                sha: ChecksumSpec::default(),
                files: Vec::new(),
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.spec.name = name.to_string();
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.spec.url = url.to_string();
        self
    }

    pub fn file(mut self, file: FileDescriptor) -> Self {
        self.spec.files.push(file);
        self
    }

    pub fn inline_checksum(mut self, checksum: &str) -> Self {
        self.spec.sha.checksum = Some(checksum.to_string());
        self
    }

    pub fn manifest(mut self, sha_type: Option<ShaType>, url: &str) -> Self {
        self.spec.sha.sha_type = sha_type;
        self.spec.sha.url = Some(url.to_string());
        self
    }

    pub fn build(self) -> BinarySpec {
        self.spec
    }
}

/// A pipeline driven by `runner`, resolving against `server`
pub fn test_pipeline(runner: Arc<FakeRunner>, server: &MockServer, temp_dir: &Path) -> UpdatePipeline {
    let client = reqwest::Client::new();
    let provider = GitHubProvider::new(client.clone(), server.uri());
    let resolver = ReleaseResolver::new(Arc::new(provider)).with_target(test_target());
    UpdatePipeline::with_components(
        VersionProbe::new(runner),
        resolver,
        Downloader::new(client),
        temp_dir.to_path_buf(),
    )
}

/// A plan that has passed the check half, for orchestrator tests
pub fn plan_for(name: &str) -> UpdatePlan {
    let spec = SpecBuilder::new(Path::new("/nonexistent/bin"))
        .name(name)
        .file(FileBuilder::new(name).build())
        .build();
    let download_folder = PathBuf::from("/nonexistent/tmp").join(name);
    UpdatePlan {
        spec,
        current_version: VERSION_1_0_0.to_string(),
        provider: Provider::GitHub,
        download_url: format!("https://example.invalid/{}", name),
        download_file_name: RAW_ASSET.to_string(),
        content_type: OCTET_STREAM.to_string(),
        new_version: TAG_V1_2_0.to_string(),
        download_file_path: download_folder.join(RAW_ASSET),
        download_folder,
        updates_available: true,
        fresh_install: false,
        stage: Stage::Comparing,
    }
}
