//! Semantic version values with the full precedence order.
//!
//! Provides the Version type that follows the semantic versioning
//! specification, including prerelease identifier classification.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::VersionRange;

/// Semantic version (major.minor.patch-prerelease+build)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Vec<Identifier>,
    pub build: Vec<String>,
}

/// One dot-separated prerelease identifier, classified at parse time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// All-digit identifier, compared numerically
    Numeric(u64),
    /// Identifier with letters or hyphens, compared in ASCII order
    Alphanumeric(String),
}

/// Version parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("'{input}' is not a valid version string")]
    InvalidFormat { input: String },

    #[error("invalid number in version: '{component}'")]
    InvalidNumber { component: String },

    #[error("invalid prerelease identifier: '{identifier}'")]
    InvalidPrerelease { identifier: String },

    #[error("invalid build metadata identifier: '{identifier}'")]
    InvalidBuild { identifier: String },

    #[error("range minimum {min} is greater than maximum {max}")]
    RangeInvariant { min: Version, max: Version },
}

impl Version {
    /// Create a new version with no prerelease or build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: Vec::new(),
            build: Vec::new(),
        }
    }

    /// Check if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }

    /// Check if this version falls inside `range`
    pub fn matches(&self, range: &VersionRange) -> bool {
        range.contains(self)
    }

    /// Compare by SemVer precedence, ignoring build metadata.
    ///
    /// Major, minor and patch compare numerically; on a tie a version with a
    /// prerelease orders below one without; two prerelease sequences compare
    /// identifier by identifier, with the shorter sequence ordering lower
    /// when it is a prefix of the longer.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        match (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)) {
            Ordering::Equal => match (self.prerelease.is_empty(), other.prerelease.is_empty()) {
                (true, true) => Ordering::Equal,
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                (false, false) => self.prerelease.cmp(&other.prerelease),
            },
            ordering => ordering,
        }
    }
}

/// Parse one dotted numeric component (major, minor or patch).
pub(super) fn parse_component(component: &str) -> Result<u64, VersionError> {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionError::InvalidNumber {
            component: component.to_string(),
        });
    }
    component.parse().map_err(|_| VersionError::InvalidNumber {
        component: component.to_string(),
    })
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

impl Identifier {
    /// Classify one prerelease identifier
    fn parse(identifier: &str) -> Result<Self, VersionError> {
        if !is_identifier(identifier) {
            return Err(VersionError::InvalidPrerelease {
                identifier: identifier.to_string(),
            });
        }
        if identifier.bytes().all(|b| b.is_ascii_digit()) {
            let value = identifier
                .parse()
                .map_err(|_| VersionError::InvalidPrerelease {
                    identifier: identifier.to_string(),
                })?;
            Ok(Identifier::Numeric(value))
        } else {
            Ok(Identifier::Alphanumeric(identifier.to_string()))
        }
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
            (Identifier::Alphanumeric(a), Identifier::Alphanumeric(b)) => a.cmp(b),
            // Numeric identifiers always have lower precedence
            (Identifier::Numeric(_), Identifier::Alphanumeric(_)) => Ordering::Less,
            (Identifier::Alphanumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(value) => write!(f, "{}", value),
            Identifier::Alphanumeric(value) => write!(f, "{}", value),
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        // Split off '+' build metadata, then '-' prerelease
        let (version_part, build) = match input.split_once('+') {
            Some((v, b)) => (v, Some(b)),
            None => (input, None),
        };
        let (core_part, prerelease) = match version_part.split_once('-') {
            Some((c, p)) => (c, Some(p)),
            None => (version_part, None),
        };

        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let major = parse_component(parts[0])?;
        let minor = parse_component(parts[1])?;
        let patch = parse_component(parts[2])?;

        let prerelease = match prerelease {
            Some(p) => p
                .split('.')
                .map(Identifier::parse)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let build = match build {
            Some(b) => b
                .split('.')
                .map(|identifier| {
                    if is_identifier(identifier) {
                        Ok(identifier.to_string())
                    } else {
                        Err(VersionError::InvalidBuild {
                            identifier: identifier.to_string(),
                        })
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Version {
            major,
            minor,
            patch,
            prerelease,
            build,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        for (i, identifier) in self.prerelease.iter().enumerate() {
            f.write_str(if i == 0 { "-" } else { "." })?;
            write!(f, "{}", identifier)?;
        }

        for (i, identifier) in self.build.iter().enumerate() {
            f.write_str(if i == 0 { "+" } else { "." })?;
            f.write_str(identifier)?;
        }

        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    /// Precedence order with build metadata as the final tiebreaker, so that
    /// `cmp` stays consistent with the derived `Eq`.
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_precedence(other)
            .then_with(|| self.build.cmp(&other.build))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_version() {
        let v: Version = "1.2.3".parse().unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
        assert!(v.prerelease.is_empty());
        assert!(v.build.is_empty());
    }

    #[test]
    fn test_parse_prerelease_classification() {
        let v: Version = "1.0.0-alpha.1.x-y".parse().unwrap();
        assert_eq!(
            v.prerelease,
            vec![
                Identifier::Alphanumeric("alpha".to_string()),
                Identifier::Numeric(1),
                Identifier::Alphanumeric("x-y".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_build_metadata_unclassified() {
        let v: Version = "1.0.0+001.sha-5114f85".parse().unwrap();
        assert!(v.prerelease.is_empty());
        assert_eq!(v.build, vec!["001".to_string(), "sha-5114f85".to_string()]);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!("".parse::<Version>().is_err());
        assert!("1".parse::<Version>().is_err());
        assert!("1.2".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
        assert!("a.b.c".parse::<Version>().is_err());
        assert!("1.2.3-".parse::<Version>().is_err());
        assert!("1.2.3-alpha..1".parse::<Version>().is_err());
        assert!("1.2.3-al pha".parse::<Version>().is_err());
        assert!("1.2.3+".parse::<Version>().is_err());
    }

    #[test]
    fn test_leading_zeros_accepted() {
        let v: Version = "1.0.0-alpha.007".parse().unwrap();
        assert_eq!(v.prerelease[1], Identifier::Numeric(7));
    }

    #[test]
    fn test_display_round_trip() {
        for input in [
            "1.2.3",
            "0.0.1",
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-x-y-z.4",
            "1.0.0+build.5",
            "1.0.0-rc.1+sha.5114f85",
        ] {
            let v: Version = input.parse().unwrap();
            assert_eq!(v.to_string(), input);
            assert_eq!(v.to_string().parse::<Version>().unwrap(), v);
        }
    }

    #[test]
    fn test_precedence_core_chain() {
        // 1.0.0 < 2.0.0 < 2.1.0 < 2.1.1
        let chain: Vec<Version> = ["1.0.0", "2.0.0", "2.1.0", "2.1.1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        for (i, a) in chain.iter().enumerate() {
            for b in &chain[i + 1..] {
                assert_eq!(a.cmp_precedence(b), Ordering::Less, "{} vs {}", a, b);
                assert_eq!(b.cmp_precedence(a), Ordering::Greater, "{} vs {}", b, a);
            }
        }
    }

    #[test]
    fn test_precedence_prerelease_chain() {
        // The reference chain from semver.org
        let chain: Vec<Version> = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
        for (i, a) in chain.iter().enumerate() {
            for b in &chain[i + 1..] {
                assert_eq!(a.cmp_precedence(b), Ordering::Less, "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_numeric_orders_below_alphanumeric() {
        let a: Version = "1.0.0-999".parse().unwrap();
        let b: Version = "1.0.0-1a".parse().unwrap();
        assert_eq!(a.cmp_precedence(&b), Ordering::Less);
    }

    #[test]
    fn test_build_metadata_ignored_by_precedence() {
        let a: Version = "1.0.0+linux".parse().unwrap();
        let b: Version = "1.0.0+darwin".parse().unwrap();
        assert_eq!(a.cmp_precedence(&b), Ordering::Equal);
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_prerelease() {
        assert!("1.0.0-rc.1".parse::<Version>().unwrap().is_prerelease());
        assert!(!"1.0.0+rc.1".parse::<Version>().unwrap().is_prerelease());
    }

    #[test]
    fn test_serde_string_form() {
        let v: Version = "1.2.3-beta.4+sha.deadbeef".parse().unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"1.2.3-beta.4+sha.deadbeef\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        assert!(serde_json::from_str::<Version>("\"nope\"").is_err());
    }
}
