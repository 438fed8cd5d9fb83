//! Cross-parser agreement and structural round-trip checks.

use tracing::debug;

use super::ast::AstNode;
use super::error::CaseFailure;
use super::fixtures::Fixture;
use super::formatter::{Formatter, format_fixture};
use super::newtypes::ParserName;
use super::normalize::normalize_tree;
use super::options::ResolvedOptions;

/// Checks that `parser` formats `fixture` exactly as the reference parser
/// did.
///
/// `reference` is the option set that produced `reference_output`; the
/// alternate run differs from it only in the parser.
///
/// # Errors
///
/// Returns [`CaseFailure::Format`] if the alternate run fails and
/// [`CaseFailure::ParserDivergence`] if its output differs by even one byte.
pub fn verify_alternate_parser(
    formatter: &dyn Formatter,
    fixture: &Fixture,
    reference: &ResolvedOptions,
    reference_output: &str,
    parser: &ParserName,
) -> Result<(), CaseFailure> {
    let options = reference.with_parser(parser.clone());
    let output =
        format_fixture(formatter, fixture, &options).map_err(|error| CaseFailure::Format {
            fixture: fixture.file_name().to_owned(),
            message: error.to_string(),
        })?;
    if output == reference_output {
        return Ok(());
    }
    Err(CaseFailure::ParserDivergence {
        fixture: fixture.file_name().to_owned(),
        reference: reference.parser.to_string(),
        parser: parser.to_string(),
        expected: reference_output.to_owned(),
        actual: output,
    })
}

/// Normalized trees from parsing a fixture before and after formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTrip {
    /// Fixture file name.
    pub fixture: String,
    /// Errors the parser recovered from in the original source.
    pub original_errors: Vec<String>,
    /// The normalized tree of the original source.
    pub original: AstNode,
    /// The normalized tree of the formatted output, or the diagnostic of the
    /// parse that failed on it.
    pub reparsed: Result<AstNode, String>,
}

impl RoundTrip {
    /// Asserts that the formatted output re-parsed and, when the original
    /// parsed cleanly, that both trees are structurally equal.
    ///
    /// Fixtures whose original parse reported errors are deliberately
    /// invalid; only the re-parse is checked for them.
    ///
    /// # Errors
    ///
    /// Returns [`CaseFailure::Reparse`] or [`CaseFailure::StructuralMismatch`].
    pub fn check(&self) -> Result<(), CaseFailure> {
        let reparsed = self.reparsed.as_ref().map_err(|diagnostic| CaseFailure::Reparse {
            fixture: self.fixture.clone(),
            diagnostic: diagnostic.clone(),
        })?;
        if !self.original_errors.is_empty() {
            debug!(
                fixture = %self.fixture,
                errors = self.original_errors.len(),
                "original parse reported errors; skipping structural comparison"
            );
            return Ok(());
        }
        if *reparsed == self.original {
            return Ok(());
        }
        Err(CaseFailure::StructuralMismatch {
            fixture: self.fixture.clone(),
            before: format!("{:?}", self.original),
            after: format!("{reparsed:?}"),
        })
    }
}

/// Parses the fixture and its formatted output and normalizes both trees.
///
/// # Errors
///
/// Returns [`CaseFailure::Parse`] when the original source cannot be parsed
/// at all. A failure to parse `formatted` is captured in
/// [`RoundTrip::reparsed`] instead.
pub fn round_trip(
    formatter: &dyn Formatter,
    fixture: &Fixture,
    options: &ResolvedOptions,
    formatted: &str,
) -> Result<RoundTrip, CaseFailure> {
    let original = formatter
        .parse(fixture.source(), options)
        .map_err(|error| CaseFailure::Parse {
            fixture: fixture.file_name().to_owned(),
            message: error.to_string(),
        })?;
    let normalized_options = formatter.normalize_options(options);
    let reparsed = formatter
        .parse(formatted, options)
        .map(|result| normalize_tree(formatter, result.ast, &normalized_options))
        .map_err(|error| error.to_string());

    Ok(RoundTrip {
        fixture: fixture.file_name().to_owned(),
        original_errors: original.errors,
        original: normalize_tree(formatter, original.ast, &normalized_options),
        reparsed,
    })
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;
