//! OS/architecture inference from release asset names
//!
//! Best-effort substring matching on lowercase file names. The result says
//! what an asset *claims* to be, not what its binary format actually is.

use std::fmt;

/// Operating system named by an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
    Unknown,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// CPU architecture named by an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Amd64,
    I386,
    Arm64,
    Unknown,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Amd64 => "amd64",
            Self::I386 => "386",
            Self::Arm64 => "arm64",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// An inferred `{os, arch}` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OsArch {
    pub os: Os,
    pub arch: Arch,
}

impl OsArch {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Infer the pair from an asset file name
    pub fn infer(file_name: &str) -> Self {
        let name = file_name.to_lowercase();

        let os = if name.contains("linux") {
            Os::Linux
        } else if name.contains("darwin") || name.contains("macos") {
            Os::Darwin
        } else if name.contains("windows") {
            Os::Windows
        } else {
            Os::Unknown
        };

        let arch = if name.contains("amd64") || name.contains("x86_64") {
            Arch::Amd64
        } else if name.contains("386") || name.contains("i686") {
            Arch::I386
        } else if name.contains("arm64") || name.contains("aarch64") {
            Arch::Arm64
        } else {
            Arch::Unknown
        };

        Self { os, arch }
    }

    /// The pair for the platform this binary was built for
    pub fn current() -> Self {
        let os = match std::env::consts::OS {
            "linux" => Os::Linux,
            "macos" => Os::Darwin,
            "windows" => Os::Windows,
            _ => Os::Unknown,
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => Arch::Amd64,
            "x86" => Arch::I386,
            "aarch64" => Arch::Arm64,
            _ => Arch::Unknown,
        };
        Self { os, arch }
    }
}

impl fmt::Display for OsArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer() {
        let cases = [
            ("", OsArch::new(Os::Unknown, Arch::Unknown)),
            ("tool.exe", OsArch::new(Os::Unknown, Arch::Unknown)),
            ("tool_linux_amd64.tar.gz", OsArch::new(Os::Linux, Arch::Amd64)),
            ("tool_darwin_arm64.zip", OsArch::new(Os::Darwin, Arch::Arm64)),
            ("windows_amd64", OsArch::new(Os::Windows, Arch::Amd64)),
            ("tool-x86_64-unknown-linux-musl", OsArch::new(Os::Linux, Arch::Amd64)),
            ("tool-aarch64-apple-darwin.tgz", OsArch::new(Os::Darwin, Arch::Arm64)),
            ("Tool_Linux_i386.tar.gz", OsArch::new(Os::Linux, Arch::I386)),
            ("tool-macos-arm64", OsArch::new(Os::Darwin, Arch::Arm64)),
        ];

        for (name, expected) in cases {
            assert_eq!(OsArch::infer(name), expected, "infer({:?})", name);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(OsArch::new(Os::Linux, Arch::I386).to_string(), "linux/386");
        assert_eq!(
            OsArch::new(Os::Unknown, Arch::Unknown).to_string(),
            "unknown/unknown"
        );
    }

    #[test]
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    fn test_current_linux_amd64() {
        assert_eq!(OsArch::current(), OsArch::new(Os::Linux, Arch::Amd64));
    }
}
