//! Lenient semantic version parsing and comparison

use semver::Version;

/// Parse a version string as a semantic version
///
/// Accepts a leading `v`/`V` and pads a missing minor or patch component
/// with zero, so `v1.2` parses as `1.2.0`.
pub fn parse_version(raw: &str) -> Result<Version, semver::Error> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);

    match Version::parse(trimmed) {
        Ok(version) => Ok(version),
        Err(err) => {
            let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
            let (core, rest) = trimmed.split_at(split);
            let parts = core.split('.').count();
            if parts >= 3 {
                return Err(err);
            }
            let padded = format!("{}{}{}", core, ".0".repeat(3 - parts), rest);
            Version::parse(&padded).map_err(|_| err)
        }
    }
}

/// Whether two versions name the same release (build metadata ignored)
pub fn same_release(a: &Version, b: &Version) -> bool {
    a.major == b.major && a.minor == b.minor && a.patch == b.patch && a.pre == b.pre
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_prefixed() {
        assert_eq!(parse_version("1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_version("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_version(" V10.0.1\n").unwrap(), Version::new(10, 0, 1));
    }

    #[test]
    fn test_parse_padded() {
        assert_eq!(parse_version("1.2").unwrap(), Version::new(1, 2, 0));
        assert_eq!(parse_version("v2").unwrap(), Version::new(2, 0, 0));
        let pre = parse_version("1.2-rc.1").unwrap();
        assert_eq!(pre.to_string(), "1.2.0-rc.1");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_version("").is_err());
        assert!(parse_version("Not Found").is_err());
        assert!(parse_version("nightly").is_err());
        assert!(parse_version("1.2.3.4").is_err());
    }

    #[test]
    fn test_ordering() {
        let pairs = [
            ("0.0.0", "0.0.1"),
            ("1.2.3", "1.2.4"),
            ("1.2.3", "1.10.0"),
            ("1.9.9", "2.0.0"),
            ("2.0.0-rc.1", "2.0.0"),
        ];
        for (a, b) in pairs {
            let a = parse_version(a).unwrap();
            let b = parse_version(b).unwrap();
            assert!(a < b, "{} < {}", a, b);
            assert!(!(b < a));
            assert!(!(a < a.clone()));
        }
    }

    #[test]
    fn test_same_release_ignores_build() {
        let a = parse_version("1.2.3+abc").unwrap();
        let b = parse_version("v1.2.3").unwrap();
        assert!(same_release(&a, &b));
        assert!(!same_release(&a, &parse_version("1.2.4").unwrap()));
    }
}
