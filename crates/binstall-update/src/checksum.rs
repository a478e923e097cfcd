//! Checksum verification of downloaded artifacts

use crate::download::Downloader;
use crate::error::{Error, Result};
use crate::install::run_blocking;
use binstall_core::utils::base_name;
use binstall_core::{ChecksumSpec, ShaType};
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Chunk size for hashing (1MB)
const HASH_CHUNK_SIZE: usize = 1024 * 1024;

fn digest_file<D: Digest>(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| Error::io_at("open", path, e))?;
    let mut hasher = D::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| Error::io_at("read", path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Lowercase hex digest of a file
pub fn compute_digest(path: &Path, sha_type: ShaType) -> Result<String> {
    match sha_type {
        ShaType::Sha256 => digest_file::<Sha256>(path),
        ShaType::Sha512 => digest_file::<Sha512>(path),
    }
}

fn is_hex_digest(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Find the digest for `file_name` in a checksum manifest
///
/// Understands `<hash>  <name>`, `<hash> *<name>` and BSD
/// `SHA256 (<name>) = <hash>` lines. A manifest whose only entry is a bare
/// hash matches any file.
pub fn parse_checksum(manifest: &str, file_name: &str) -> Option<String> {
    let wanted = base_name(file_name);
    let lines: Vec<&str> = manifest
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();

    for line in &lines {
        if let Some((lhs, hash)) = line.split_once(") = ") {
            if let Some((_, name)) = lhs.split_once(" (") {
                if base_name(name).eq_ignore_ascii_case(wanted) && is_hex_digest(hash.trim()) {
                    return Some(hash.trim().to_string());
                }
            }
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(hash), Some(name)) = (fields.next(), fields.next()) else {
            continue;
        };
        let name = name.strip_prefix('*').unwrap_or(name);
        if is_hex_digest(hash) && base_name(name).eq_ignore_ascii_case(wanted) {
            return Some(hash.to_string());
        }
    }

    match lines.as_slice() {
        [only] if is_hex_digest(only) => Some((*only).to_string()),
        _ => None,
    }
}

/// How an artifact was verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Inline,
    Manifest,
    Skipped,
}

/// Applies a spec's checksum policy to a downloaded file
#[derive(Debug, Clone)]
pub struct ChecksumVerifier {
    downloader: Downloader,
}

impl ChecksumVerifier {
    pub fn new(downloader: Downloader) -> Self {
        Self { downloader }
    }

    /// Verify `path` against an inline checksum or manifest
    ///
    /// Fails with `ChecksumMismatch` when the digest differs.
    pub async fn verify(&self, path: &Path, spec: &ChecksumSpec) -> Result<Verification> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(expected) = spec.inline() {
            let sha_type = spec.sha_type.unwrap_or_default();
            check(path, &file_name, sha_type, expected.trim()).await?;
            return Ok(Verification::Inline);
        }

        if let Some(url) = spec.manifest_url() {
            let sha_type = spec.sha_type.ok_or_else(|| Error::ChecksumTypeMissing {
                url: url.to_string(),
            })?;
            let manifest = self.downloader.fetch_text(url).await?;
            let expected =
                parse_checksum(&manifest, &file_name).ok_or_else(|| Error::ChecksumEntryNotFound {
                    file: file_name.clone(),
                    url: url.to_string(),
                })?;
            check(path, &file_name, sha_type, &expected).await?;
            return Ok(Verification::Manifest);
        }

        debug!("No checksum configured for {}, skipping verification", file_name);
        Ok(Verification::Skipped)
    }
}

async fn check(path: &Path, file_name: &str, sha_type: ShaType, expected: &str) -> Result<()> {
    let owned = path.to_path_buf();
    let actual = run_blocking(format!("Failed to hash {}", path.display()), move || {
        compute_digest(&owned, sha_type)
    })
    .await?;
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(Error::ChecksumMismatch {
            file: file_name.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    debug!("{} checksum verified for {}", sha_type, file_name);
    Ok(())
}
