//! Shared path helpers

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Get the user's home directory
///
/// Prefers the HOME environment variable over `dirs::home_dir()` so that
/// overridden homes (containers, tests) are respected.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir().ok_or(Error::NoHomeDir)
}

/// Expand a leading `~/` (or a bare `~`) to the home directory
pub fn expand_home(path: &str) -> Result<PathBuf> {
    if path == "~" {
        return get_home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => Ok(get_home_dir()?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}

/// Base name of a path-like string, ignoring both `/` and `\` prefixes
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Whether `name` is a single plain path component
///
/// Rejects `.`, `..`, absolute paths and anything containing `/` or `\`.
pub fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// File name of an archive without its extension
///
/// Strips one extension and then a trailing `.tar`, so
/// `tool_linux_amd64.tar.gz` becomes `tool_linux_amd64`.
pub fn file_stem_without_tar(file_name: &str) -> String {
    let base = base_name(file_name);
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(base);
    stem.strip_suffix(".tar").unwrap_or(stem).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_expand_home() {
        let original = std::env::var("HOME").ok();
        std::env::set_var("HOME", "/home/tester");

        assert_eq!(
            expand_home("~/.local/bin").unwrap(),
            PathBuf::from("/home/tester/.local/bin")
        );
        assert_eq!(expand_home("~").unwrap(), PathBuf::from("/home/tester"));
        assert_eq!(
            expand_home("/usr/local/bin").unwrap(),
            PathBuf::from("/usr/local/bin")
        );

        match original {
            Some(home) => std::env::set_var("HOME", home),
            None => std::env::remove_var("HOME"),
        }
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("dist/tool.tar.gz"), "tool.tar.gz");
        assert_eq!(base_name("./dist\\tool.zip"), "tool.zip");
        assert_eq!(base_name("tool"), "tool");
    }

    #[test]
    fn test_is_plain_file_name() {
        assert!(is_plain_file_name("gh"));
        assert!(is_plain_file_name("tool.v2"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name("."));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("a/b"));
        assert!(!is_plain_file_name("a/"));
        assert!(!is_plain_file_name("a\\b"));
        assert!(!is_plain_file_name("/abs"));
    }

    #[test]
    fn test_file_stem_without_tar() {
        assert_eq!(file_stem_without_tar("test"), "test");
        assert_eq!(file_stem_without_tar("test.txt"), "test");
        assert_eq!(
            file_stem_without_tar("tool_linux_amd64.tar.gz"),
            "tool_linux_amd64"
        );
        assert_eq!(file_stem_without_tar("tool-1.0.tar.xz"), "tool-1.0");
        assert_eq!(file_stem_without_tar("tool_darwin_arm64.zip"), "tool_darwin_arm64");
    }
}
