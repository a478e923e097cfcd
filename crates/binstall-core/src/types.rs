//! Binary spec types
//!
//! A [`BinarySpec`] is the declarative description of one managed binary,
//! read from a YAML file:
//!
//! ```yaml
//! name: gh
//! url: https://github.com/cli/cli
//! installLocation: ~/.local/bin
//! sha:
//!   shaType: sha256
//!   url: https://github.com/cli/cli/releases/download/v2.60.0/gh_2.60.0_checksums.txt
//! files:
//!   - fileName: gh
//!     sourcePath: bin/gh
//!     copyIt: true
//!     checkVersion: true
//!     versionCommand:
//!       args: --version
//!       regexVersion: 'version \d+\.\d+\.\d+'
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Declarative description of one managed binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinarySpec {
    /// Unique name, also used for the temporary download folder
    pub name: String,

    /// Release source URL (e.g. `https://github.com/owner/repo`)
    pub url: String,

    /// Install directory; `~/` expands to the home directory
    pub install_location: String,

    /// Skip this binary entirely
    #[serde(default)]
    pub ignore: bool,

    /// Checksum descriptor
    #[serde(default)]
    pub sha: ChecksumSpec,

    /// Files produced by a release
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
}

impl BinarySpec {
    /// Files that are installed into the install location
    pub fn copied_files(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.files.iter().filter(|f| f.copy_it)
    }

    /// Files whose version is probed before and after installation
    pub fn version_checked_files(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.files.iter().filter(|f| f.check_version)
    }
}

/// Checksum algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaType {
    #[default]
    Sha256,
    Sha512,
}

impl fmt::Display for ShaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Sha512 => write!(f, "sha512"),
        }
    }
}

/// How a downloaded artifact is verified
///
/// An inline `checksum` wins over a manifest `url`; with neither, no
/// verification is performed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecksumSpec {
    /// Digest algorithm
    #[serde(default)]
    pub sha_type: Option<ShaType>,

    /// Inline expected digest
    #[serde(default)]
    pub checksum: Option<String>,

    /// URL of a checksum manifest
    #[serde(default)]
    pub url: Option<String>,
}

impl ChecksumSpec {
    /// Inline checksum, if a non-empty one is configured
    pub fn inline(&self) -> Option<&str> {
        self.checksum.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Manifest URL, if a non-empty one is configured
    pub fn manifest_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// One file produced by a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// File name, also the default source and destination name
    pub file_name: String,

    /// Path inside the extracted archive, when it differs from `file_name`
    #[serde(default)]
    pub source_path: Option<String>,

    /// Destination name, when it differs from `file_name`
    #[serde(default)]
    pub rename_to: Option<String>,

    /// Whether this file is installed
    #[serde(default = "default_true")]
    pub copy_it: bool,

    /// Whether this file's version is probed before and after install
    #[serde(default, alias = "execute")]
    pub check_version: bool,

    /// Run the new file and clear the destination before overwriting it
    #[serde(default)]
    pub execute_when_copying: bool,

    /// Version reporting invocation
    #[serde(default)]
    pub version_command: VersionCommand,
}

impl FileDescriptor {
    /// Path of this file relative to the download folder
    pub fn source_name(&self) -> &str {
        self.source_path
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.file_name)
    }

    /// Name of this file in the install location
    pub fn destination_name(&self) -> &str {
        self.rename_to
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.file_name)
    }
}

fn default_true() -> bool {
    true
}

/// Arguments and extraction pattern for a version probe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionCommand {
    /// Arguments; a single string in YAML is one argument
    #[serde(default, deserialize_with = "string_or_seq")]
    pub args: Vec<String>,

    /// Pattern whose first match holds the version
    #[serde(default)]
    pub regex_version: String,
}

fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if s.is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_spec() {
        let yaml = r#"
name: test
url: https://github.com/owner/repo
installLocation: ~/.local/bin
files:
  - fileName: test
"#;
        let spec: BinarySpec = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(spec.name, "test");
        assert!(!spec.ignore);
        assert_eq!(spec.sha, ChecksumSpec::default());

        let file = &spec.files[0];
        assert!(file.copy_it);
        assert!(!file.check_version);
        assert_eq!(file.source_name(), "test");
        assert_eq!(file.destination_name(), "test");
        assert!(file.version_command.args.is_empty());
    }

    #[test]
    fn test_parse_full_spec() {
        let yaml = r#"
name: gh
url: https://github.com/cli/cli
installLocation: /opt/bin
ignore: false
sha:
  shaType: sha512
  checksum: ABCDEF
files:
  - fileName: gh
    sourcePath: bin/gh
    renameTo: github
    execute: true
    executeWhenCopying: true
    versionCommand:
      args: [version, --short]
      regexVersion: '\d+\.\d+\.\d+'
"#;
        let spec: BinarySpec = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(spec.sha.sha_type, Some(ShaType::Sha512));
        assert_eq!(spec.sha.inline(), Some("ABCDEF"));
        assert_eq!(spec.sha.manifest_url(), None);

        let file = &spec.files[0];
        assert!(file.check_version);
        assert!(file.execute_when_copying);
        assert_eq!(file.source_name(), "bin/gh");
        assert_eq!(file.destination_name(), "github");
        assert_eq!(file.version_command.args, vec!["version", "--short"]);
    }

    #[test]
    fn test_version_args_single_string() {
        let yaml = "args: --version\nregexVersion: 'v\\d+'\n";
        let cmd: VersionCommand = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(cmd.args, vec!["--version"]);

        let yaml = "args: ''\n";
        let cmd: VersionCommand = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_copied_and_checked_files() {
        let yaml = r#"
name: multi
url: https://github.com/owner/repo
installLocation: /tmp
files:
  - fileName: a
    checkVersion: true
  - fileName: b
    copyIt: false
"#;
        let spec: BinarySpec = serde_yaml_ng::from_str(yaml).unwrap();
        let copied: Vec<_> = spec.copied_files().map(|f| f.file_name.as_str()).collect();
        let checked: Vec<_> = spec
            .version_checked_files()
            .map(|f| f.file_name.as_str())
            .collect();
        assert_eq!(copied, vec!["a"]);
        assert_eq!(checked, vec!["a"]);
    }
}
