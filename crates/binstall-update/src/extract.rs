//! Content sniffing and archive extraction

use crate::error::{Error, Result};
use binstall_core::utils::file_stem_without_tar;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::Path;
use tar::Archive;
use tracing::debug;

/// Declared media types accepted for non-executable downloads
pub const ALLOWED_MEDIA_TYPES: &[&str] = &[
    "application/gzip",
    "application/x-gzip",
    "application/zip",
    "application/x-zip-compressed",
    "application/x-tar",
    "application/x-gtar",
    "application/x-bzip-compressed-tar",
    "raw",
];

/// Bytes needed to recognise every supported format
const SNIFF_LEN: usize = 512;

/// Offset of the `ustar` magic in a tar header
const USTAR_OFFSET: usize = 257;

/// What a downloaded file actually contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Executable,
    Gzip,
    Zip,
    Tar,
    Bzip2,
    Xz,
    Unknown,
}

impl ArtifactKind {
    /// Classify by leading bytes
    pub fn sniff(header: &[u8]) -> Self {
        const MACHO: [[u8; 4]; 5] = [
            [0xFE, 0xED, 0xFA, 0xCE],
            [0xFE, 0xED, 0xFA, 0xCF],
            [0xCE, 0xFA, 0xED, 0xFE],
            [0xCF, 0xFA, 0xED, 0xFE],
            [0xCA, 0xFE, 0xBA, 0xBE],
        ];

        if header.starts_with(b"\x7fELF")
            || header.starts_with(b"MZ")
            || header.starts_with(b"#!")
            || MACHO.iter().any(|m| header.starts_with(m))
        {
            Self::Executable
        } else if header.starts_with(&[0x1F, 0x8B]) {
            Self::Gzip
        } else if header.starts_with(b"PK\x03\x04") || header.starts_with(b"PK\x05\x06") {
            Self::Zip
        } else if header.starts_with(b"BZh") {
            Self::Bzip2
        } else if header.starts_with(&[0xFD, b'7', b'z', b'X', b'Z', 0x00]) {
            Self::Xz
        } else if is_tar_header(header) {
            Self::Tar
        } else {
            Self::Unknown
        }
    }

    /// Classify a file on disk
    pub fn detect(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io_at("open", path, e))?;
        let mut header = Vec::with_capacity(SNIFF_LEN);
        file.take(SNIFF_LEN as u64)
            .read_to_end(&mut header)
            .map_err(|e| Error::io_at("read", path, e))?;
        Ok(Self::sniff(&header))
    }

    pub fn is_executable(self) -> bool {
        self == Self::Executable
    }
}

fn is_tar_header(header: &[u8]) -> bool {
    header
        .get(USTAR_OFFSET..USTAR_OFFSET + 5)
        .is_some_and(|magic| magic == b"ustar")
}

/// Media type without parameters, lowercased
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

pub fn is_allowed_media_type(content_type: &str) -> bool {
    ALLOWED_MEDIA_TYPES.contains(&media_type(content_type).as_str())
}

/// Result of extracting a download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The download is itself the executable
    NotNeeded,
    /// The download was unpacked as the given format
    Extracted(ArtifactKind),
}

/// Unpack `archive` into `dest` when it is not already an executable
pub fn extract_artifact(archive: &Path, dest: &Path, content_type: &str) -> Result<Extraction> {
    let kind = ArtifactKind::detect(archive)?;
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if kind.is_executable() {
        debug!("{} is an executable, no extraction needed", file_name);
        return Ok(Extraction::NotNeeded);
    }

    let unsupported = || Error::UnsupportedArchiveFormat {
        file: file_name.clone(),
        media_type: media_type(content_type),
    };

    if !is_allowed_media_type(content_type) {
        return Err(unsupported());
    }

    debug!("Extracting {} ({:?}) into {}", file_name, kind, dest.display());
    let failed = |e: io::Error| Error::Extraction {
        path: archive.display().to_string(),
        message: e.to_string(),
    };

    match kind {
        ArtifactKind::Gzip => extract_gzip(archive, dest, &file_name).map_err(failed)?,
        ArtifactKind::Zip => extract_zip(archive, dest).map_err(|message| Error::Extraction {
            path: archive.display().to_string(),
            message,
        })?,
        ArtifactKind::Tar => {
            let file = File::open(archive).map_err(failed)?;
            unpack_tar(file, dest).map_err(failed)?
        }
        ArtifactKind::Bzip2 | ArtifactKind::Xz | ArtifactKind::Unknown | ArtifactKind::Executable => {
            return Err(unsupported())
        }
    }

    Ok(Extraction::Extracted(kind))
}

fn unpack_tar<R: Read>(reader: R, dest: &Path) -> io::Result<()> {
    let mut archive = Archive::new(reader);
    archive.set_preserve_permissions(true);
    archive.unpack(dest)
}

/// A gzip stream is either a tarball or a single compressed file
fn extract_gzip(archive: &Path, dest: &Path, file_name: &str) -> io::Result<()> {
    let mut decoder = GzDecoder::new(File::open(archive)?);
    let mut header = Vec::with_capacity(SNIFF_LEN);
    (&mut decoder)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut header)?;

    let lower = file_name.to_lowercase();
    let named_tar = lower.ends_with(".tar.gz") || lower.ends_with(".tgz");
    let stream = Cursor::new(header.clone()).chain(decoder);

    if is_tar_header(&header) || named_tar {
        return unpack_tar(stream, dest);
    }

    let out_name = file_name
        .strip_suffix(".gz")
        .map(str::to_string)
        .unwrap_or_else(|| file_stem_without_tar(file_name));
    let out_path = dest.join(out_name);
    let mut reader = stream;
    let mut out = File::create(&out_path)?;
    io::copy(&mut reader, &mut out)?;
    Ok(())
}

fn extract_zip(archive: &Path, dest: &Path) -> std::result::Result<(), String> {
    let file = File::open(archive).map_err(|e| e.to_string())?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| e.to_string())?;
        let Some(relative) = entry.enclosed_name() else {
            debug!("Skipping zip entry with unsafe path: {}", entry.name());
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| e.to_string())?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let mut outfile = File::create(&outpath).map_err(|e| e.to_string())?;
        io::copy(&mut entry, &mut outfile).map_err(|e| e.to_string())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))
                    .map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}
