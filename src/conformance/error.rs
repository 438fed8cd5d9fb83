//! Error types for conformance suite registration, execution and the
//! external collaborators the suite drives.

use std::io;

use camino::Utf8PathBuf;

/// Errors that abort suite registration or summarise a failed run.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// A suite was requested without any parser to test.
    #[error("no parsers were specified for {dir}")]
    NoParsers {
        /// The fixture directory the suite was requested for.
        dir: Utf8PathBuf,
    },

    /// Reading a fixture directory or fixture file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path being read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The directory definition file is malformed.
    #[error("invalid definition file {path}: {message}")]
    Definition {
        /// The definition file path.
        path: Utf8PathBuf,
        /// The deserializer message.
        message: String,
    },

    /// A version range string is not valid semantic-version range syntax.
    #[error("invalid version range '{range}': {reason}")]
    InvalidVersionRange {
        /// The offending range string.
        range: String,
        /// Why the range was rejected.
        reason: String,
    },

    /// A parser name failed validation.
    #[error("invalid parser name '{name}': {reason}")]
    InvalidParserName {
        /// The offending parser name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// One or more suite units failed.
    #[error("{failed} of {total} conformance units failed:\n{summary}")]
    UnitsFailed {
        /// Number of failed units.
        failed: usize,
        /// Number of executed units.
        total: usize,
        /// One line per failed unit.
        summary: String,
    },
}

/// Failures while asking an interpreter executable for its version.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The executable could not be spawned (usually not installed).
    #[error("failed to spawn '{executable}': {source}")]
    Spawn {
        /// The executable that was tried.
        executable: String,
        /// The spawn error.
        #[source]
        source: io::Error,
    },

    /// The executable ran but exited unsuccessfully.
    #[error("'{executable}' exited with status {status:?}: {stderr}")]
    Exit {
        /// The executable that was tried.
        executable: String,
        /// The exit code, if the process was not killed by a signal.
        status: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
}

/// Failures raised by a formatter while formatting or parsing.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The formatter rejected the input (syntax error, bad option, crash).
    #[error("{message}")]
    Rejected {
        /// The formatter's diagnostic.
        message: String,
    },

    /// An external formatter process could not be spawned.
    #[error("failed to spawn formatter '{program}': {source}")]
    Spawn {
        /// The formatter program.
        program: String,
        /// The spawn or pipe error.
        #[source]
        source: io::Error,
    },

    /// An external formatter process exited unsuccessfully.
    #[error("formatter '{program}' exited with status {status:?}: {stderr}")]
    Exit {
        /// The formatter program.
        program: String,
        /// The exit code, if any.
        status: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The formatter produced output that could not be decoded.
    #[error("formatter produced invalid output: {message}")]
    InvalidOutput {
        /// What was wrong with the output.
        message: String,
    },
}

impl FormatError {
    /// Builds a [`FormatError::Rejected`] from any diagnostic message.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// An assertion failure isolated to a single suite unit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaseFailure {
    /// No resolved interpreter satisfies the requested range.
    #[error("no installed interpreter satisfies '{range}'")]
    NoInterpreter {
        /// The requested version range.
        range: String,
    },

    /// Full cross-version coverage was requested but tracks are missing.
    #[error("interpreter tracks not available: {}", .missing.join(", "))]
    MissingTracks {
        /// Names of the tracks that did not resolve.
        missing: Vec<String>,
    },

    /// The fixture file could not be read as UTF-8 text.
    #[error("reading {fixture} failed: {message}")]
    Unreadable {
        /// Fixture file name.
        fixture: String,
        /// The I/O diagnostic.
        message: String,
    },

    /// Formatting the fixture failed.
    #[error("formatting {fixture} failed: {message}")]
    Format {
        /// Fixture file name.
        fixture: String,
        /// The formatter diagnostic.
        message: String,
    },

    /// Parsing the original fixture failed outright.
    #[error("parsing {fixture} failed: {message}")]
    Parse {
        /// Fixture file name.
        fixture: String,
        /// The parser diagnostic.
        message: String,
    },

    /// An alternate parser produced different output from the reference.
    #[error(
        "parser '{parser}' output for {fixture} differs from '{reference}'\n\
         --- {reference}\n{expected}\n--- {parser}\n{actual}"
    )]
    ParserDivergence {
        /// Fixture file name.
        fixture: String,
        /// The primary parser.
        reference: String,
        /// The alternate parser.
        parser: String,
        /// Output under the primary parser.
        expected: String,
        /// Output under the alternate parser.
        actual: String,
    },

    /// The formatted output could not be parsed again.
    #[error("re-parsing formatted {fixture} failed: {diagnostic}")]
    Reparse {
        /// Fixture file name.
        fixture: String,
        /// The parser diagnostic.
        diagnostic: String,
    },

    /// The normalized trees before and after formatting differ.
    #[error("formatting changed the syntax tree of {fixture}\nbefore: {before}\nafter:  {after}")]
    StructuralMismatch {
        /// Fixture file name.
        fixture: String,
        /// Debug rendering of the normalized original tree.
        before: String,
        /// Debug rendering of the normalized re-parsed tree.
        after: String,
    },

    /// The snapshot store rejected the recorded value.
    #[error("snapshot '{name}' does not match: {message}")]
    Snapshot {
        /// Snapshot key.
        name: String,
        /// Store diagnostic.
        message: String,
    },

    /// The unit body panicked.
    #[error("unit panicked: {message}")]
    Panicked {
        /// The panic payload, when it was a string.
        message: String,
    },
}
