//! Binary spec loading from a directory of YAML files
//!
//! Each `*.yaml` / `*.yml` file in the directory holds one [`BinarySpec`].
//! [`SpecSet`] globs the directory once and can be iterated any number of
//! times; each entry is either a validated spec or the error for that file,
//! so callers decide whether to abort or skip.

use crate::error::{Error, Result};
use crate::types::BinarySpec;
use crate::utils::is_plain_file_name;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The spec files found in a directory
#[derive(Debug, Clone)]
pub struct SpecSet {
    files: Vec<PathBuf>,
}

impl SpecSet {
    /// Collect the spec files in `dir`, sorted by path
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::SpecDirNotFound {
                path: dir.display().to_string(),
            });
        }

        let dir = fs::canonicalize(dir)?;
        let mut files = Vec::new();
        for ext in ["yaml", "yml"] {
            let pattern = glob::Pattern::escape(&dir.to_string_lossy()) + &format!("/*.{}", ext);
            debug!("Globbing spec files: {}", pattern);
            files.extend(glob::glob(&pattern)?.filter_map(|entry| entry.ok()));
        }
        files.sort();

        Ok(Self { files })
    }

    /// Build a set from explicit file paths
    pub fn from_files(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    /// Paths of the spec files
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of spec files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no spec files were found
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over the specs, loading and validating each file lazily
    pub fn iter(&self) -> SpecIter<'_> {
        SpecIter {
            files: self.files.iter(),
            seen: HashSet::new(),
        }
    }
}

impl<'a> IntoIterator for &'a SpecSet {
    type Item = Result<BinarySpec>;
    type IntoIter = SpecIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over the specs of a [`SpecSet`]
pub struct SpecIter<'a> {
    files: std::slice::Iter<'a, PathBuf>,
    seen: HashSet<String>,
}

impl Iterator for SpecIter<'_> {
    type Item = Result<BinarySpec>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        let result = load_spec_file(path).and_then(|spec| {
            if self.seen.insert(spec.name.clone()) {
                Ok(spec)
            } else {
                Err(Error::DuplicateName {
                    name: spec.name,
                    path: path.display().to_string(),
                })
            }
        });
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

/// Read, parse and validate a single spec file
pub fn load_spec_file(path: &Path) -> Result<BinarySpec> {
    let path_name = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| Error::ReadSpec {
        path: path_name.clone(),
        source,
    })?;
    let spec = parse_spec(&content).map_err(|source| Error::ParseSpec {
        path: path_name.clone(),
        source,
    })?;
    validate_spec(&spec).map_err(|message| Error::invalid_spec(path_name, message))?;
    Ok(spec)
}

/// Parse a spec from YAML text without validating it
pub fn parse_spec(content: &str) -> std::result::Result<BinarySpec, serde_yaml_ng::Error> {
    serde_yaml_ng::from_str(content)
}

/// Check the invariants a spec must satisfy before the pipeline sees it
pub fn validate_spec(spec: &BinarySpec) -> std::result::Result<(), String> {
    if spec.name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    if !is_plain_file_name(&spec.name) {
        return Err(format!(
            "name '{}' must be a plain file name without path separators",
            spec.name
        ));
    }
    if spec.url.trim().is_empty() {
        return Err(format!("{}: url must not be empty", spec.name));
    }
    if spec.install_location.trim().is_empty() {
        return Err(format!("{}: installLocation must not be empty", spec.name));
    }
    if spec.files.is_empty() {
        return Err(format!("{}: at least one file is required", spec.name));
    }
    if spec.sha.manifest_url().is_some() && spec.sha.inline().is_none() && spec.sha.sha_type.is_none()
    {
        return Err(format!(
            "{}: sha.shaType is required when sha.url is set",
            spec.name
        ));
    }

    for file in &spec.files {
        if file.file_name.trim().is_empty() {
            return Err(format!("{}: fileName must not be empty", spec.name));
        }
        if file.check_version {
            if file.version_command.regex_version.is_empty() {
                return Err(format!(
                    "{}: {} has checkVersion set but no versionCommand.regexVersion",
                    spec.name, file.file_name
                ));
            }
            if let Err(e) = Regex::new(&file.version_command.regex_version) {
                return Err(format!(
                    "{}: invalid regexVersion for {}: {}",
                    spec.name, file.file_name, e
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_yaml(name: &str) -> String {
        format!(
            "name: {name}\nurl: https://github.com/owner/{name}\ninstallLocation: /tmp/bin\nfiles:\n  - fileName: {name}\n"
        )
    }

    #[test]
    fn test_validate_rejects_missing_files() {
        let spec = parse_spec(
            "name: x\nurl: https://github.com/o/x\ninstallLocation: /tmp\nfiles: []\n",
        )
        .unwrap();
        let err = validate_spec(&spec).unwrap_err();
        assert!(err.contains("at least one file"));
    }

    #[test]
    fn test_validate_rejects_bad_regex() {
        let yaml = format!(
            "{}    checkVersion: true\n    versionCommand:\n      regexVersion: '(['\n",
            spec_yaml("x")
        );
        let spec = parse_spec(&yaml).unwrap();
        let err = validate_spec(&spec).unwrap_err();
        assert!(err.contains("invalid regexVersion"));
    }

    #[test]
    fn test_validate_requires_sha_type_for_manifest() {
        let yaml = format!(
            "{}sha:\n  url: https://example.com/checksums.txt\n",
            spec_yaml("x")
        );
        let spec = parse_spec(&yaml).unwrap();
        let err = validate_spec(&spec).unwrap_err();
        assert!(err.contains("shaType"));
    }

    #[test]
    fn test_validate_accepts_minimal() {
        let spec = parse_spec(&spec_yaml("ok")).unwrap();
        assert!(validate_spec(&spec).is_ok());
    }
}
