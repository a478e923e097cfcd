//! Per-binary update pipeline
//!
//! The check half (probe, resolve, compare) decides whether a binary needs
//! work and produces an [`UpdatePlan`]. The install half consumes the plan:
//!
//! ```text
//! Probing -> Resolving -> (FreshInstall | Comparing) -> Downloading
//!   -> Verifying -> Extracting -> Installing -> Confirming -> Done
//! ```
//!
//! A failure in any stage stops that binary only; the stage it happened in is
//! kept on the resulting [`Outcome`].

use crate::checksum::ChecksumVerifier;
use crate::download::{build_client, Downloader};
use crate::error::{BinaryFailure, Error, Result, VersionKind};
use crate::install::ArchiveInstaller;
use crate::probe::VersionProbe;
use crate::releases::{GitHubProvider, Provider, ReleaseResolver, ResolvedRelease};
use crate::version::{parse_version, same_release};
use binstall_core::{expand_home, BinarySpec, RunConfig};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Current version shown for binaries that are not installed
pub const NOT_FOUND_VERSION: &str = "Not Found";

/// Current version assumed when the installed version cannot be detected
pub const UNKNOWN_VERSION: &str = "0.0.0";

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Probing,
    Resolving,
    FreshInstall,
    Comparing,
    Downloading,
    Verifying,
    Extracting,
    Installing,
    Confirming,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Probing => "probing",
            Self::Resolving => "resolving",
            Self::FreshInstall => "fresh install",
            Self::Comparing => "comparing",
            Self::Downloading => "downloading",
            Self::Verifying => "verifying",
            Self::Extracting => "extracting",
            Self::Installing => "installing",
            Self::Confirming => "confirming",
            Self::Done => "done",
        };
        write!(f, "{}", s)
    }
}

/// Everything needed to install one binary's latest release
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    pub spec: BinarySpec,
    pub current_version: String,
    pub provider: Provider,
    pub download_url: String,
    pub download_file_name: String,
    pub content_type: String,
    pub new_version: String,
    pub download_folder: PathBuf,
    pub download_file_path: PathBuf,
    pub updates_available: bool,
    pub fresh_install: bool,
    pub stage: Stage,
}

impl UpdatePlan {
    fn new(
        spec: &BinarySpec,
        current_version: String,
        resolved: ResolvedRelease,
        temp_dir: &Path,
    ) -> Self {
        let download_folder = temp_dir.join(&spec.name);
        let download_file_path = download_folder.join(&resolved.asset.name);
        Self {
            spec: spec.clone(),
            current_version,
            provider: resolved.provider,
            download_url: resolved.asset.browser_download_url,
            download_file_name: resolved.asset.name,
            content_type: resolved.asset.content_type,
            new_version: resolved.tag,
            download_folder,
            download_file_path,
            updates_available: false,
            fresh_install: false,
            stage: Stage::Resolving,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

/// Result of the check half
#[derive(Debug, Clone)]
pub enum CheckOutcome {
    /// The installed version is not older than the latest release
    UpToDate {
        name: String,
        current: String,
        latest: String,
    },
    /// The latest release has nothing for this platform
    NoAsset { name: String },
    /// An update or fresh install is needed
    Update(Box<UpdatePlan>),
}

/// Final result of one binary's install
#[derive(Debug)]
pub struct Outcome {
    pub name: String,
    pub current_version: String,
    pub new_version: String,
    /// Last stage entered; the failing stage when `error` is set
    pub stage: Stage,
    pub error: Option<Error>,
}

impl Outcome {
    fn from_plan(plan: &UpdatePlan, error: Option<Error>) -> Self {
        Self {
            name: plan.spec.name.clone(),
            current_version: plan.current_version.clone(),
            new_version: plan.new_version.clone(),
            stage: plan.stage,
            error,
        }
    }

    /// Outcome for a plan whose worker stopped without reporting
    pub fn aborted(plan: &UpdatePlan, message: impl Into<String>) -> Self {
        Self::from_plan(
            plan,
            Some(Error::Aborted {
                message: message.into(),
            }),
        )
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Check-then-install state machine for one binary
#[derive(Clone)]
pub struct UpdatePipeline {
    probe: VersionProbe,
    resolver: ReleaseResolver,
    verifier: ChecksumVerifier,
    installer: ArchiveInstaller,
    temp_dir: PathBuf,
}

impl UpdatePipeline {
    /// Build the pipeline with real processes and the GitHub API
    pub fn new(config: &RunConfig) -> Result<Self> {
        let client = build_client(config)?;
        let provider = Arc::new(GitHubProvider::from_config(client.clone(), config));
        Ok(Self::with_components(
            VersionProbe::process(),
            ReleaseResolver::new(provider),
            Downloader::new(client),
            config.temp_dir().clone(),
        ))
    }

    /// Build the pipeline from explicit components
    pub fn with_components(
        probe: VersionProbe,
        resolver: ReleaseResolver,
        downloader: Downloader,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            verifier: ChecksumVerifier::new(downloader.clone()),
            installer: ArchiveInstaller::new(downloader, probe.clone()),
            probe,
            resolver,
            temp_dir,
        }
    }

    /// Version reported by the installed copy
    ///
    /// Empty when no file is version-checked or the output has no match.
    async fn current_version(&self, spec: &BinarySpec) -> Result<String> {
        let Some(file) = spec.version_checked_files().next() else {
            debug!("{}: no version-checked file", spec.name);
            return Ok(String::new());
        };

        let install_dir = expand_home(&spec.install_location)?;
        let program = VersionProbe::installed_program(&install_dir, file);
        self.probe.probe(&program, file).await
    }

    /// Decide whether `spec` needs an update
    pub async fn check(
        &self,
        spec: &BinarySpec,
    ) -> std::result::Result<CheckOutcome, BinaryFailure> {
        let fail = |stage, error| BinaryFailure::new(&spec.name, stage, error);

        info!("{}: probing installed version", spec.name);
        let current = match self.current_version(spec).await {
            Ok(version) => Some(version),
            Err(Error::VersionProbeNotFound { program }) => {
                debug!("{}: {} not found, treating as fresh install", spec.name, program);
                None
            }
            Err(e) => return Err(fail(Stage::Probing, e)),
        };

        info!("{}: resolving latest release", spec.name);
        let resolved = match self.resolver.resolve(spec).await {
            Ok(resolved) => resolved,
            Err(Error::NoMatchingAsset { os_arch }) => {
                debug!("{}: no binary found for {}", spec.name, os_arch);
                return Ok(CheckOutcome::NoAsset {
                    name: spec.name.clone(),
                });
            }
            Err(e) => return Err(fail(Stage::Resolving, e)),
        };

        let Some(current) = current else {
            let mut plan = UpdatePlan::new(
                spec,
                NOT_FOUND_VERSION.to_string(),
                resolved,
                &self.temp_dir,
            );
            plan.updates_available = true;
            plan.fresh_install = true;
            plan.stage = Stage::FreshInstall;
            return Ok(CheckOutcome::Update(Box::new(plan)));
        };

        let current = if current.is_empty() {
            UNKNOWN_VERSION.to_string()
        } else {
            current
        };

        let parse = |kind, version: &str| {
            parse_version(version).map_err(|source| {
                fail(
                    Stage::Comparing,
                    Error::VersionParse {
                        name: spec.name.clone(),
                        kind,
                        version: version.to_string(),
                        source,
                    },
                )
            })
        };
        let current_semver = parse(VersionKind::Current, &current)?;
        let new_semver = parse(VersionKind::New, &resolved.tag)?;

        if current_semver < new_semver {
            debug!("{}: {} -> {}", spec.name, current, resolved.tag);
            let mut plan = UpdatePlan::new(spec, current, resolved, &self.temp_dir);
            plan.updates_available = true;
            plan.stage = Stage::Comparing;
            Ok(CheckOutcome::Update(Box::new(plan)))
        } else {
            debug!("{}: {} is up to date ({})", spec.name, current, resolved.tag);
            Ok(CheckOutcome::UpToDate {
                name: spec.name.clone(),
                current,
                latest: resolved.tag,
            })
        }
    }

    /// Run the install half of `plan`
    pub async fn install(&self, mut plan: UpdatePlan) -> Outcome {
        let result = self.run_install(&mut plan).await;
        if let Err(e) = &result {
            warn!("{}: failed while {}: {}", plan.spec.name, plan.stage, e);
        }
        Outcome::from_plan(&plan, result.err())
    }

    async fn run_install(&self, plan: &mut UpdatePlan) -> Result<()> {
        let name = plan.spec.name.clone();

        plan.stage = Stage::Downloading;
        info!("{}: downloading {}", name, plan.download_url);
        self.installer
            .download(&plan.download_url, &plan.download_folder, &plan.download_file_path)
            .await?;

        plan.stage = Stage::Verifying;
        let verification = self
            .verifier
            .verify(&plan.download_file_path, &plan.spec.sha)
            .await?;
        debug!("{}: checksum {:?}", name, verification);

        plan.stage = Stage::Extracting;
        let extraction = self
            .installer
            .extract(&plan.download_file_path, &plan.download_folder, &plan.content_type)
            .await?;
        debug!("{}: {:?}", name, extraction);

        plan.stage = Stage::Installing;
        info!("{}: installing into {}", name, plan.spec.install_location);
        self.installer
            .place(&plan.spec, &plan.download_folder, &plan.download_file_name)
            .await?;

        plan.stage = Stage::Confirming;
        self.confirm(plan).await?;

        plan.stage = Stage::Done;
        info!("{}: updated to {}", name, plan.new_version);
        Ok(())
    }

    /// Require every installed, version-checked file to report the release tag
    async fn confirm(&self, plan: &UpdatePlan) -> Result<()> {
        let install_dir = expand_home(&plan.spec.install_location)?;

        for file in plan.spec.version_checked_files().filter(|f| f.copy_it) {
            let dest_name = file.destination_name();
            let installed = install_dir.join(dest_name);
            if !installed.exists() {
                return Err(Error::NotInstalled {
                    path: installed.display().to_string(),
                });
            }

            match which::which(dest_name) {
                Ok(found) if found != installed => warn!(
                    "{} resolves to {} on PATH, not the installed {}",
                    dest_name,
                    found.display(),
                    installed.display()
                ),
                Ok(_) => {}
                Err(_) => warn!("{} is not on PATH", dest_name),
            }

            let reported = self.probe.probe(&installed, file).await?;
            let mismatch = || Error::PostInstallVersionMismatch {
                file: dest_name.to_string(),
                installed: reported.clone(),
                expected: plan.new_version.clone(),
            };
            if reported.is_empty() {
                return Err(mismatch());
            }

            let installed_semver =
                parse_version(&reported).map_err(|source| Error::VersionParse {
                    name: plan.spec.name.clone(),
                    kind: VersionKind::Installed,
                    version: reported.clone(),
                    source,
                })?;
            let expected_semver =
                parse_version(&plan.new_version).map_err(|source| Error::VersionParse {
                    name: plan.spec.name.clone(),
                    kind: VersionKind::New,
                    version: plan.new_version.clone(),
                    source,
                })?;

            if !same_release(&installed_semver, &expected_semver) {
                return Err(mismatch());
            }
            debug!("{}: confirmed {}", dest_name, reported);
        }

        Ok(())
    }
}
