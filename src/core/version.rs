//! Project versions and version-compatibility policies.
//!
//! Project versions are written the way the build tool writes them
//! (`2.0`, `1`, `3.1.4`). They are kept verbatim for display and parsed
//! leniently into a semver [`Version`] for comparisons.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned for version strings that cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid version `{0}` (expected MAJOR[.MINOR[.PATCH]])")]
pub struct VersionError(pub String);

/// A project version as written, plus its parsed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectVersion {
    raw: String,
    parsed: Version,
}

impl ProjectVersion {
    /// A `MAJOR.MINOR` version.
    pub fn new(major: u64, minor: u64) -> Self {
        ProjectVersion {
            raw: format!("{}.{}", major, minor),
            parsed: Version::new(major, minor, 0),
        }
    }

    /// The version exactly as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The version as semver, with missing components filled with zero.
    pub fn semver(&self) -> &Version {
        &self.parsed
    }
}

impl FromStr for ProjectVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let parsed = parse_version_lenient(raw).ok_or_else(|| VersionError(s.to_string()))?;
        Ok(ProjectVersion {
            raw: raw.to_string(),
            parsed,
        })
    }
}

impl fmt::Display for ProjectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ProjectVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ProjectVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a version string, allowing for incomplete versions.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    let parts: Vec<&str> = s.split('.').collect();
    match parts.as_slice() {
        [major] => Some(Version::new(major.parse().ok()?, 0, 0)),
        [major, minor] => Some(Version::new(major.parse().ok()?, minor.parse().ok()?, 0)),
        _ => None,
    }
}

/// How an installed package version is matched against a requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Compatibility {
    /// Any installed version at least as new as the request
    #[default]
    AnyNewerVersion,
    /// Same major version, at least as new
    SameMajorVersion,
    /// Same major.minor, at least as new
    SameMinorVersion,
    /// Exactly the requested version
    ExactVersion,
}

impl Compatibility {
    /// Check whether `installed` satisfies a request for `requested`.
    pub fn is_compatible(&self, installed: &Version, requested: &Version) -> bool {
        match self {
            Compatibility::AnyNewerVersion => installed >= requested,
            Compatibility::SameMajorVersion => {
                installed.major == requested.major && installed >= requested
            }
            Compatibility::SameMinorVersion => {
                installed.major == requested.major
                    && installed.minor == requested.minor
                    && installed >= requested
            }
            Compatibility::ExactVersion => installed == requested,
        }
    }

    /// Name used in generated version files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Compatibility::AnyNewerVersion => "AnyNewerVersion",
            Compatibility::SameMajorVersion => "SameMajorVersion",
            Compatibility::SameMinorVersion => "SameMinorVersion",
            Compatibility::ExactVersion => "ExactVersion",
        }
    }
}

impl FromStr for Compatibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AnyNewerVersion" => Ok(Compatibility::AnyNewerVersion),
            "SameMajorVersion" => Ok(Compatibility::SameMajorVersion),
            "SameMinorVersion" => Ok(Compatibility::SameMinorVersion),
            "ExactVersion" => Ok(Compatibility::ExactVersion),
            other => Err(format!("unknown compatibility policy `{}`", other)),
        }
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
