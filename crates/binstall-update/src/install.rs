//! Download, extraction and placement of release files

use crate::download::{prepare_download_folder, Downloader};
use crate::error::{Error, Result};
use crate::extract::{extract_artifact, Extraction};
use crate::probe::VersionProbe;
use binstall_core::utils::file_stem_without_tar;
use binstall_core::{expand_home, BinarySpec, FileDescriptor};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fallback source location for archives that unpack into a subdirectory
///
/// `tool_linux_amd64.tar.gz` often extracts to `tool_linux_amd64/<path>`
/// instead of `<path>`; the adjusted path is
/// `<download folder>/<archive base name>/<relative path>`.
#[derive(Debug, Clone)]
pub struct PathAdjustment {
    download_folder: PathBuf,
    archive_base: String,
}

impl PathAdjustment {
    pub fn new(download_folder: impl Into<PathBuf>, download_file_name: &str) -> Self {
        Self {
            download_folder: download_folder.into(),
            archive_base: file_stem_without_tar(download_file_name),
        }
    }

    /// Source path without adjustment
    pub fn direct(&self, relative: &str) -> PathBuf {
        self.download_folder.join(relative)
    }

    /// Source path inside the archive-named subdirectory
    pub fn adjusted(&self, relative: &str) -> PathBuf {
        self.download_folder.join(&self.archive_base).join(relative)
    }

    /// Existing source path, direct first
    pub fn locate(&self, relative: &str) -> Option<PathBuf> {
        [self.direct(relative), self.adjusted(relative)]
            .into_iter()
            .find(|p| p.exists())
    }

    /// Move `relative` to `dest`, retrying once at the adjusted path when the
    /// direct source does not exist
    pub fn move_file(&self, relative: &str, dest: &Path) -> Result<PathBuf> {
        let direct = self.direct(relative);
        match rename_or_copy(&direct, dest) {
            Ok(()) => Ok(direct),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let adjusted = self.adjusted(relative);
                debug!(
                    "{} not found, retrying at {}",
                    direct.display(),
                    adjusted.display()
                );
                rename_or_copy(&adjusted, dest).map_err(|source| Error::MoveFailure {
                    from: adjusted.display().to_string(),
                    to: dest.display().to_string(),
                    source,
                })?;
                Ok(adjusted)
            }
            Err(source) => Err(Error::MoveFailure {
                from: direct.display().to_string(),
                to: dest.display().to_string(),
                source,
            }),
        }
    }
}

/// Rename, falling back to copy-then-remove across filesystems
fn rename_or_copy(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        other => other,
    }
}

/// Run blocking filesystem work off the async worker threads
pub(crate) async fn run_blocking<T, F>(context: String, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::io(context, io::Error::other(e)))?
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| Error::io_at("set execute permissions on", path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Downloads, unpacks and installs one release
#[derive(Clone)]
pub struct ArchiveInstaller {
    downloader: Downloader,
    probe: VersionProbe,
}

impl ArchiveInstaller {
    pub fn new(downloader: Downloader, probe: VersionProbe) -> Self {
        Self { downloader, probe }
    }

    /// Download `url` into a freshly emptied `folder`
    pub async fn download(&self, url: &str, folder: &Path, file_path: &Path) -> Result<u64> {
        prepare_download_folder(folder).await?;
        self.downloader.download(url, file_path).await
    }

    /// Unpack the download in place unless it is already an executable
    pub async fn extract(
        &self,
        file_path: &Path,
        folder: &Path,
        content_type: &str,
    ) -> Result<Extraction> {
        let file_path = file_path.to_path_buf();
        let folder = folder.to_path_buf();
        let content_type = content_type.to_string();
        let path_for_error = file_path.display().to_string();

        tokio::task::spawn_blocking(move || extract_artifact(&file_path, &folder, &content_type))
            .await
            .map_err(|e| Error::Extraction {
                path: path_for_error,
                message: e.to_string(),
            })?
    }

    /// Install every copied file of `spec` from `folder`
    ///
    /// Returns the installed destination paths.
    pub async fn place(
        &self,
        spec: &BinarySpec,
        folder: &Path,
        download_file_name: &str,
    ) -> Result<Vec<PathBuf>> {
        let install_dir = expand_home(&spec.install_location)?;
        fs::create_dir_all(&install_dir)
            .map_err(|e| Error::io_at("create install directory", &install_dir, e))?;

        let adjustment = PathAdjustment::new(folder, download_file_name);
        let mut installed = Vec::new();

        for file in spec.copied_files() {
            let dest = install_dir.join(file.destination_name());
            self.place_file(file, &adjustment, &dest).await?;
            installed.push(dest);
        }

        Ok(installed)
    }

    async fn place_file(
        &self,
        file: &FileDescriptor,
        adjustment: &PathAdjustment,
        dest: &Path,
    ) -> Result<()> {
        let source = file.source_name();

        if file.execute_when_copying {
            let located = adjustment.locate(source).ok_or_else(|| Error::SourceMissing {
                path: adjustment.direct(source).display().to_string(),
            })?;

            if file.check_version {
                self.probe.run(&located, file).await?;
            }

            match fs::remove_file(dest) {
                Ok(()) => debug!("Removed existing {}", dest.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io_at("remove existing file", dest, e)),
            }
        }

        let from = {
            let adjustment = adjustment.clone();
            let source = source.to_string();
            let dest = dest.to_path_buf();
            run_blocking(format!("Failed to move {}", source), move || {
                adjustment.move_file(&source, &dest)
            })
            .await?
        };
        info!("Moved {} to {}", from.display(), dest.display());

        if !dest.exists() {
            return Err(Error::NotInstalled {
                path: dest.display().to_string(),
            });
        }

        make_executable(dest)?;

        if file.check_version {
            match self.probe.probe(dest, file).await {
                Ok(version) => debug!("{} reports '{}' after install", dest.display(), version),
                Err(e) => warn!("{} did not run after install: {}", dest.display(), e),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_adjusted_path() {
        let adj = PathAdjustment::new("/tmp/tool", "tool_linux_amd64.tar.gz");
        assert_eq!(adj.direct("bin/tool"), PathBuf::from("/tmp/tool/bin/tool"));
        assert_eq!(
            adj.adjusted("bin/tool"),
            PathBuf::from("/tmp/tool/tool_linux_amd64/bin/tool")
        );

        let adj = PathAdjustment::new("/tmp/tool", "tool.zip");
        assert_eq!(adj.adjusted("tool"), PathBuf::from("/tmp/tool/tool/tool"));
    }

    #[test]
    fn test_move_direct() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tool"), "bin").unwrap();
        let dest = dir.path().join("dest");

        let adj = PathAdjustment::new(dir.path(), "tool.tar.gz");
        let from = adj.move_file("tool", &dest).unwrap();
        assert_eq!(from, dir.path().join("tool"));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "bin");
    }

    #[test]
    fn test_move_retries_adjusted_path() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("tool_linux_amd64");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("tool"), "bin").unwrap();
        let dest = dir.path().join("dest");

        let adj = PathAdjustment::new(dir.path(), "tool_linux_amd64.tar.gz");
        let from = adj.move_file("tool", &dest).unwrap();
        assert_eq!(from, nested.join("tool"));
        assert!(dest.exists());
    }

    #[test]
    fn test_move_retries_nested_source_path() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("gh_2.60.1_linux_amd64").join("bin");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("gh"), "bin").unwrap();
        let dest = dir.path().join("dest");

        let adj = PathAdjustment::new(dir.path(), "gh_2.60.1_linux_amd64.tar.gz");
        let from = adj.move_file("bin/gh", &dest).unwrap();
        assert_eq!(from, nested.join("gh"));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "bin");
    }

    #[tokio::test]
    async fn test_run_blocking_propagates_results() {
        assert_eq!(run_blocking("count".to_string(), || Ok(3)).await.unwrap(), 3);

        let err = run_blocking::<(), _>("place".to_string(), || {
            Err(Error::NotInstalled {
                path: "/opt/bin/tool".to_string(),
            })
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotInstalled { .. }));

        let err = run_blocking::<(), _>("Failed to move tool".to_string(), || panic!("boom"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_move_fails_after_retry() {
        let dir = TempDir::new().unwrap();
        let adj = PathAdjustment::new(dir.path(), "tool_linux_amd64.tar.gz");
        let err = adj.move_file("tool", &dir.path().join("dest")).unwrap_err();
        match err {
            Error::MoveFailure { from, .. } => assert!(from.contains("tool_linux_amd64")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_locate_prefers_direct() {
        let dir = TempDir::new().unwrap();
        let adj = PathAdjustment::new(dir.path(), "tool_linux_amd64.tgz");
        assert!(adj.locate("tool").is_none());

        let nested = dir.path().join("tool_linux_amd64");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("tool"), "x").unwrap();
        assert_eq!(adj.locate("tool"), Some(nested.join("tool")));

        fs::write(dir.path().join("tool"), "x").unwrap();
        assert_eq!(adj.locate("tool"), Some(dir.path().join("tool")));
    }
}
