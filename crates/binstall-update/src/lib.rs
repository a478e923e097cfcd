//! # binstall-update
//!
//! The update pipeline for binstall:
//! - Version probing of installed binaries
//! - GitHub latest-release resolution and per-platform asset selection
//! - Streaming download, checksum verification and archive extraction
//! - Placement into the install location with a path-adjustment retry
//! - A bounded worker pool that runs many pipelines and collects outcomes

pub mod checksum;
pub mod download;
pub mod error;
pub mod extract;
pub mod install;
pub mod orchestrator;
pub mod pipeline;
pub mod platform;
pub mod probe;
pub mod releases;
pub mod version;

pub use checksum::{compute_digest, parse_checksum, ChecksumVerifier, Verification};
pub use download::{build_client, Downloader};
pub use error::{BinaryFailure, Error, Result, VersionKind};
pub use extract::{ArtifactKind, Extraction};
pub use install::{ArchiveInstaller, PathAdjustment};
pub use orchestrator::{NoopObserver, Orchestrator, OutcomeObserver, PlanExecutor, Report};
pub use pipeline::{CheckOutcome, Outcome, Stage, UpdatePipeline, UpdatePlan};
pub use platform::{Arch, Os, OsArch};
pub use probe::{extract_version, CommandRunner, ProbeError, ProcessRunner, VersionProbe};
pub use releases::{
    GitHubProvider, GitHubRepo, Provider, Release, ReleaseAsset, ReleaseProvider,
    ReleaseResolver, ResolvedRelease,
};
pub use version::parse_version;
