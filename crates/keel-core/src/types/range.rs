//! Half-open version ranges for compatibility matching.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::version::{parse_component, Version, VersionError};

/// A `[min, max)` range of versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    /// Inclusive lower bound
    pub min: Version,
    /// Exclusive upper bound
    pub max: Version,
}

impl VersionRange {
    /// Create a range, rejecting `min > max`
    pub fn new(min: Version, max: Version) -> Result<Self, VersionError> {
        if min.cmp_precedence(&max) == Ordering::Greater {
            return Err(VersionError::RangeInvariant { min, max });
        }
        Ok(Self { min, max })
    }

    /// Check if `version` falls inside this range
    pub fn contains(&self, version: &Version) -> bool {
        self.min.cmp_precedence(version) != Ordering::Greater
            && version.cmp_precedence(&self.max) == Ordering::Less
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    /// Parse a permissive `MAJOR[.MINOR[.PATCH]]` constraint into a
    /// caret-style range: `2.3` allows `[2.3.0, 3.0.0)`, while any `0.x`
    /// minor bump is treated as breaking, so `0.3` allows `[0.3.0, 0.4.0)`.
    ///
    /// Exact-pin and operator-prefixed forms (`>=`, `=`, `~`) are not
    /// accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let parts: Vec<&str> = input.split('.').collect();
        if parts.len() > 3 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let major = parse_component(parts[0])?;
        let minor = parts.get(1).map(|p| parse_component(p)).transpose()?.unwrap_or(0);
        let patch = parts.get(2).map(|p| parse_component(p)).transpose()?.unwrap_or(0);

        if major == 0 {
            Ok(Self {
                min: Version::new(0, minor, patch),
                max: Version::new(0, minor + 1, 0),
            })
        } else {
            Ok(Self {
                min: Version::new(major, minor, patch),
                max: Version::new(major + 1, 0, 0),
            })
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">={}, <{}", self.min, self.max)
    }
}
