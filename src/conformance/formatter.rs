//! The formatter under test and how the harness invokes it.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use indexmap::IndexMap;
use tracing::debug;

use super::ast::{AstNode, ParseResult};
use super::error::FormatError;
use super::fixtures::Fixture;
use super::options::ResolvedOptions;
use super::value::OptionValue;

/// A formatter exercised by the conformance suite.
///
/// Implementations must be side-effect free on shared memory; each call is
/// independent and may block until an external process finishes.
pub trait Formatter {
    /// Formats `source` under `options`.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] for syntax errors, unsupported options or
    /// internal failures. No partial output is returned.
    fn format(&self, source: &str, options: &ResolvedOptions) -> Result<String, FormatError>;

    /// Parses `source` into a debug syntax tree.
    ///
    /// Recoverable problems are reported in [`ParseResult::errors`]; an
    /// `Err` means the parser gave up entirely.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when no tree could be produced.
    fn parse(&self, source: &str, options: &ResolvedOptions) -> Result<ParseResult, FormatError>;

    /// Canonicalizes options before they drive tree cleaning.
    fn normalize_options(&self, options: &ResolvedOptions) -> ResolvedOptions {
        options.clone()
    }

    /// Drops fields the formatter considers cosmetic from one node.
    ///
    /// Called for every mapping node with its kind; the default keeps
    /// everything.
    fn clean(
        &self,
        _kind: Option<&str>,
        _fields: &mut IndexMap<String, AstNode>,
        _options: &ResolvedOptions,
    ) {
    }
}

/// Formats a fixture, propagating the formatter's error untouched.
///
/// # Errors
///
/// Returns whatever [`FormatError`] the formatter raised.
pub fn format_fixture(
    formatter: &dyn Formatter,
    fixture: &Fixture,
    options: &ResolvedOptions,
) -> Result<String, FormatError> {
    debug!(
        fixture = %fixture.path(),
        parser = %options.parser,
        interpreter = %options.interpreter,
        "formatting fixture"
    );
    formatter.format(fixture.source(), options)
}

/// Drives an external formatter through its command-line interface.
///
/// Source text is written to stdin and the result read from stdout. Every
/// option becomes a flag: `--parser`, `--interpreter`, `--stdin-filepath`,
/// one `--plugin-search-dir` per root, and `--<key> <value>` for passthrough
/// options (`--<key>` / `--no-<key>` for booleans). Parsing adds the
/// configured AST flag and expects `{"ast": ..., "errors": [...]}` as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFormatter {
    program: String,
    base_args: Vec<String>,
    ast_flag: String,
}

impl CommandFormatter {
    /// Default flag asking the formatter for a JSON syntax tree.
    pub const DEFAULT_AST_FLAG: &'static str = "--debug-print-ast";

    /// Creates an adapter for `program` with no extra arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            ast_flag: Self::DEFAULT_AST_FLAG.to_owned(),
        }
    }

    /// Arguments placed before the option flags on every invocation.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the flag that switches the formatter into AST output.
    #[must_use]
    pub fn with_ast_flag(mut self, flag: impl Into<String>) -> Self {
        self.ast_flag = flag.into();
        self
    }

    /// The full argument list for one invocation.
    #[must_use]
    pub fn arguments(&self, options: &ResolvedOptions, print_ast: bool) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.extend([
            "--parser".to_owned(),
            options.parser.to_string(),
            "--interpreter".to_owned(),
            options.interpreter.executable.clone(),
            "--stdin-filepath".to_owned(),
            options.file_path.to_string(),
        ]);
        for dir in &options.base.plugin_search_dirs {
            args.push("--plugin-search-dir".to_owned());
            args.push(dir.to_string());
        }
        for (key, value) in &options.base.passthrough {
            match value {
                OptionValue::Bool(true) => args.push(format!("--{key}")),
                OptionValue::Bool(false) => args.push(format!("--no-{key}")),
                other => {
                    args.push(format!("--{key}"));
                    args.push(other.to_string());
                }
            }
        }
        if print_ast {
            args.push(self.ast_flag.clone());
        }
        args
    }

    fn run(&self, args: &[String], source: &str) -> Result<String, FormatError> {
        let spawn_error = |error| FormatError::Spawn {
            program: self.program.clone(),
            source: error,
        };
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let stdin = child.stdin.take();
        let (waited, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut pipe) => pipe.write_all(source.as_bytes()),
                None => Ok(()),
            });
            let waited = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (waited, written)
        });
        let output = waited.map_err(spawn_error)?;

        if !output.status.success() {
            return Err(FormatError::Exit {
                program: self.program.clone(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        written.map_err(spawn_error)?;
        String::from_utf8(output.stdout).map_err(|error| FormatError::InvalidOutput {
            message: error.to_string(),
        })
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, source: &str, options: &ResolvedOptions) -> Result<String, FormatError> {
        self.run(&self.arguments(options, false), source)
    }

    fn parse(&self, source: &str, options: &ResolvedOptions) -> Result<ParseResult, FormatError> {
        let stdout = self.run(&self.arguments(options, true), source)?;
        serde_json::from_str(&stdout).map_err(|error| FormatError::InvalidOutput {
            message: error.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "formatter_tests.rs"]
mod tests;
