//! Shared constants for test infrastructure

use binstall_update::{Arch, Os, OsArch};

pub const OWNER: &str = "acme";
pub const REPO: &str = "tool";
pub const SOURCE_URL: &str = "https://github.com/acme/tool";
pub const UNSUPPORTED_URL: &str = "https://gitlab.com/acme/tool";

pub const BINARY_NAME: &str = "tool";

pub const TAG_V1_0_0: &str = "v1.0.0";
pub const TAG_V1_2_0: &str = "v1.2.0";
pub const TAG_V1_3_0: &str = "v1.3.0";

pub const VERSION_1_0_0: &str = "1.0.0";
pub const VERSION_1_2_0: &str = "1.2.0";

// Asset names
pub const RAW_ASSET: &str = "tool_linux_amd64";
pub const TARBALL_ASSET: &str = "tool_linux_amd64.tar.gz";
pub const DARWIN_ASSET: &str = "tool_darwin_arm64.tar.gz";
pub const SIGNATURE_ASSET: &str = "tool_linux_amd64.tar.gz.sig";
pub const CHECKSUMS_ASSET: &str = "checksums.txt";

// Media types
pub const OCTET_STREAM: &str = "application/octet-stream";
pub const GZIP: &str = "application/gzip";

/// Pattern matching the output of fake binaries
pub const VERSION_REGEX: &str = r"version \d+\.\d+\.\d+";

pub const TOKEN: &str = "ghp_testtoken";

/// Platform the resolver targets in tests, independent of the host
pub fn test_target() -> OsArch {
    OsArch::new(Os::Linux, Arch::Amd64)
}
