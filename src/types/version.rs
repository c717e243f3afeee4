// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loosely formatted firmware version strings.
//!
//! WLED reports versions such as `0.14.0`, `0.15.0-b3` or `0.13.0b4`, and
//! occasionally garbage (`Unknown`, build ids). [`Version::parse`] accepts
//! anything and yields a version that is either comparable or marked invalid.
//! Parsed values are cached process-wide since the same handful of strings is
//! seen on every state refresh. The cache holds at most 128 entries and starts
//! over once full.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use parking_lot::Mutex;
use semver::{BuildMetadata, Prerelease};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Oldest firmware a [`Device`](crate::model::Device) can be built from.
pub const MIN_SUPPORTED_VERSION: &str = "0.14.0";

const CACHE_CAPACITY: usize = 128;

static CACHE: LazyLock<Mutex<HashMap<String, Version>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// A firmware version, possibly invalid.
///
/// Valid versions order by semantic versioning rules, so pre-releases sort
/// before their release (`0.15.0-b3 < 0.15.0`). Invalid versions are neither
/// smaller nor greater than anything.
///
/// # Examples
///
/// ```
/// use wled_lib::types::Version;
///
/// let version = Version::parse("0.15.0-b3");
/// assert!(version.is_valid());
/// assert!(version < Version::parse("0.15.0"));
/// assert!(version >= "0.14");
///
/// let unknown = Version::parse("Unknown");
/// assert!(!unknown.is_valid());
/// assert!(unknown.partial_cmp(&version).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parsed: Option<semver::Version>,
}

impl Version {
    /// Parses a version string, consulting the process-wide cache first.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(hit) = CACHE.lock().get(raw) {
            return hit.clone();
        }

        let version = Self {
            raw: raw.trim().to_string(),
            parsed: normalize(raw),
        };
        let mut cache = CACHE.lock();
        if cache.len() >= CACHE_CAPACITY {
            cache.clear();
        }
        cache.insert(raw.to_string(), version.clone());
        version
    }

    /// Returns `true` if the string could be understood as a version.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }

    /// Returns the normalized semantic version, if valid.
    #[must_use]
    pub fn as_semver(&self) -> Option<&semver::Version> {
        self.parsed.as_ref()
    }

    /// Returns the string as reported by the device.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if this version is valid and not older than `other`.
    #[must_use]
    pub fn at_least(&self, other: &str) -> bool {
        matches!(
            self.partial_cmp(&Self::parse(other)),
            Some(Ordering::Greater | Ordering::Equal)
        )
    }

    /// Returns `true` if this version is valid and older than `other`.
    #[must_use]
    pub fn older_than(&self, other: &str) -> bool {
        matches!(
            self.partial_cmp(&Self::parse(other)),
            Some(Ordering::Less)
        )
    }
}

fn normalize(raw: &str) -> Option<semver::Version> {
    let s = raw.trim().trim_start_matches(['v', 'V']);
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (core, suffix) = s.split_at(split);
    let core = core.strip_suffix('.').unwrap_or(core);

    let parts = core
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;
    let (major, minor, patch) = match parts.as_slice() {
        [major] => (*major, 0, 0),
        [major, minor] => (*major, *minor, 0),
        [major, minor, patch] => (*major, *minor, *patch),
        _ => return None,
    };

    let suffix = suffix.trim_start_matches(['-', '.', '_']);
    let (pre, build) = suffix.split_once('+').unwrap_or((suffix, ""));

    Some(semver::Version {
        major,
        minor,
        patch,
        pre: Prerelease::new(pre).ok()?,
        build: BuildMetadata::new(build).ok()?,
    })
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        match (&self.parsed, &other.parsed) {
            (Some(a), Some(b)) => a.cmp_precedence(b) == Ordering::Equal,
            (None, None) => self.raw == other.raw,
            _ => false,
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (&self.parsed, &other.parsed) {
            (Some(a), Some(b)) => Some(a.cmp_precedence(b)),
            _ => None,
        }
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        *self == Self::parse(other)
    }
}

impl PartialOrd<&str> for Version {
    fn partial_cmp(&self, other: &&str) -> Option<Ordering> {
        self.partial_cmp(&Self::parse(other))
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_stays_bounded() {
        for build in 0..CACHE_CAPACITY * 3 {
            let version = Version::parse(&format!("0.14.{build}"));
            assert!(version.is_valid());
            assert!(CACHE.lock().len() <= CACHE_CAPACITY);
        }

        let again = Version::parse("0.14.0");
        assert_eq!(again.as_semver(), Some(&semver::Version::new(0, 14, 0)));
    }

    #[test]
    fn parses_plain_versions() {
        let version = Version::parse("0.14.0");
        assert!(version.is_valid());
        assert_eq!(version.as_semver(), Some(&semver::Version::new(0, 14, 0)));
    }

    #[test]
    fn pads_short_versions() {
        assert_eq!(Version::parse("0.14"), Version::parse("0.14.0"));
        assert_eq!(Version::parse("1"), Version::parse("1.0.0"));
    }

    #[test]
    fn accepts_beta_suffixes() {
        for raw in ["0.15.0-b3", "0.15.0b3", "v0.15.0-b3", "0.15.0.b3"] {
            let version = Version::parse(raw);
            assert!(version.is_valid(), "{raw} should parse");
            assert!(version < Version::parse("0.15.0"), "{raw} is a pre-release");
            assert!(version > Version::parse("0.14.4"));
        }
    }

    #[test]
    fn invalid_strings_are_marked() {
        for raw in ["", "Unknown", "a.b.c", "1.2.3.4", "1..2"] {
            assert!(!Version::parse(raw).is_valid(), "{raw} should be invalid");
        }
    }

    #[test]
    fn invalid_versions_do_not_compare() {
        let unknown = Version::parse("Unknown");
        assert!(!unknown.at_least("0.0.1"));
        assert!(!unknown.older_than("99.0.0"));
        assert_eq!(unknown, Version::parse("Unknown"));
    }

    #[test]
    fn compares_against_literals() {
        let version = Version::parse("0.13.3");
        assert!(version < "0.14.0");
        assert!(version >= "0.10.0");
        assert!(version == "0.13.3");
        assert!(version.older_than(MIN_SUPPORTED_VERSION));
    }

    #[test]
    fn cache_returns_equal_values() {
        let first = Version::parse("0.14.1");
        let second = Version::parse("0.14.1");
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "0.14.1");
    }
}
