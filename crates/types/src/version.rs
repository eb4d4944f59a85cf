//! Engine and runtime version parsing/ordering
//!
//! Engine versions (`2.3.12`, `2.2.0-beta`) are ordinary semver and are
//! compared with [`semver::Version`]'s existing pre-release ordering, which
//! already satisfies `2.2.0-beta < 2.2.0`. Java runtime versions use their
//! own historical format and need a dedicated major-version extractor.

use fleet_errors::{Error, PrecheckError};
use std::cmp::Ordering;
use std::fmt;

/// An engine release version, e.g. `2.3.12` or `2.2.0-beta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVersion(semver::Version);

impl EngineVersion {
    /// # Errors
    /// Returns an error if `s` is not valid semver.
    pub fn parse(s: &str) -> Result<Self, Error> {
        semver::Version::parse(s)
            .map(Self)
            .map_err(|e| PrecheckError::InvalidVersion {
                value: s.to_string(),
                message: e.to_string(),
            }
            .into())
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for EngineVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EngineVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Extracts the Java major version from a `java -version`-style string:
/// - legacy `1.X.Y_Z` format (Java 8 and earlier) yields `X`
/// - modern `X.Y.Z` / bare `X` format (Java 9+) yields `X`
///
/// # Errors
/// Returns an error if no leading numeric component can be parsed.
pub fn java_major_version(raw: &str) -> Result<u32, Error> {
    let raw = raw.trim();
    let mut parts = raw.splitn(2, '.');
    let first: u32 = parts
        .next()
        .unwrap_or(raw)
        .parse()
        .map_err(|_| PrecheckError::InvalidVersion {
            value: raw.to_string(),
            message: "no leading numeric component".to_string(),
        })?;

    if first == 1 {
        // Legacy "1.8.0_202" style: major version is the second component,
        // up to the next '.' or '_'.
        let rest = parts.next().unwrap_or_default();
        let second = rest
            .split(|c| c == '.' || c == '_')
            .next()
            .unwrap_or_default();
        second
            .parse()
            .map_err(|_| PrecheckError::InvalidVersion {
                value: raw.to_string(),
                message: "malformed legacy version".to_string(),
            }
            .into())
    } else {
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_java_version() {
        assert_eq!(java_major_version("1.8.0_202").unwrap(), 8);
    }

    #[test]
    fn modern_java_version() {
        assert_eq!(java_major_version("11.0.25").unwrap(), 11);
        assert_eq!(java_major_version("21").unwrap(), 21);
    }

    #[test]
    fn engine_version_ordering() {
        let v = |s: &str| EngineVersion::parse(s).unwrap();
        assert!(v("2.3.11") < v("2.3.12"));
        assert!(v("2.3.12") < v("2.4.0"));
        assert!(v("2.2.0-beta") < v("2.2.0"));
    }
}
