//! Semantic-version ranges and lenient parsing of interpreter-reported
//! version strings.

use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use serde::Deserialize;
use serde::de;

use super::error::HarnessError;

/// The universal wildcard range.
pub const WILDCARD: &str = "*";

/// A version range a suite restricts its interpreters to.
///
/// `"*"` (or an empty string) is kept distinct from a parsed requirement so it
/// also admits pre-release interpreters, which `semver` requirements never
/// match unless they name one explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionRange {
    /// Every version.
    #[default]
    Any,
    /// Versions satisfying a `semver` requirement such as `>=3.6, <4`.
    Req(VersionReq),
}

impl VersionRange {
    /// Parses a range string.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidVersionRange`] when the string is not
    /// valid `semver` requirement syntax.
    pub fn parse(range: &str) -> Result<Self, HarnessError> {
        let trimmed = range.trim();
        if trimmed.is_empty() || trimmed == WILDCARD {
            return Ok(Self::Any);
        }
        VersionReq::parse(trimmed)
            .map(Self::Req)
            .map_err(|error| HarnessError::InvalidVersionRange {
                range: range.to_owned(),
                reason: error.to_string(),
            })
    }

    /// Returns `true` if `version` lies within the range.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Req(req) => req.matches(version),
        }
    }

    /// Returns `true` for the universal wildcard.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl FromStr for VersionRange {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(WILDCARD),
            Self::Req(req) => write!(f, "{req}"),
        }
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

/// Parses the version string an interpreter printed.
///
/// Interpreters print bare versions such as `3.11.4`; release candidates glue
/// their suffix to the numeric core (`3.13.0rc2`), which is read as the
/// pre-release `3.13.0-rc2`. Returns `None` for anything else that is not a
/// semantic version.
#[must_use]
pub fn parse_reported_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split);
    if suffix.is_empty() || suffix.starts_with(['-', '+']) {
        return Version::parse(trimmed).ok();
    }
    Version::parse(&format!("{core}-{suffix}")).ok()
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
