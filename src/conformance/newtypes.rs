//! Validated newtypes for harness identifiers.
//!
//! `ParserName` wraps a `String` that has passed validation at construction
//! time, so suite code never has to re-check parser identifiers.

use std::fmt;

use serde::Deserialize;
use serde::de;

use super::error::HarnessError;

/// A validated parser identifier, such as `python` or `python3`.
///
/// Construction (via deserialization or [`ParserName::new`]) ensures the
/// name is non-empty and contains only ASCII alphanumerics, `-`, `_` or `.`,
/// so it can be embedded in unit names and command-line flags unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParserName(String);

impl ParserName {
    /// Creates a new `ParserName` after validating the input.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidParserName`] if the name is empty or
    /// contains characters outside `[A-Za-z0-9._-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, HarnessError> {
        let owned = name.into();
        validate_parser_name(&owned)?;
        Ok(Self(owned))
    }

    /// Returns the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_parser_name(name: &str) -> Result<(), HarnessError> {
    let reject = |reason: &str| HarnessError::InvalidParserName {
        name: name.to_owned(),
        reason: reason.to_owned(),
    };
    if name.is_empty() {
        return Err(reject("parser names must be non-empty"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(reject("only ASCII letters, digits, '-', '_' and '.' are allowed"));
    }
    Ok(())
}

impl PartialEq<&str> for ParserName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl AsRef<str> for ParserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ParserName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        validate_parser_name(&s).map_err(de::Error::custom)?;
        Ok(Self(s))
    }
}
