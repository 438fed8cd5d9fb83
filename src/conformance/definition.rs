//! Per-directory suite definitions.
//!
//! A fixture directory may carry a [`DEFINITION_FILE_NAME`] declaring which
//! parsers to run, which interpreter versions to run them under, and which
//! options to pass:
//!
//! ```yaml
//! parsers: [python, python3]
//! versions: ">=3.6"
//! coverage: any
//! options:
//!   plugins: ["."]
//!   tab-width: 4
//! ```
//!
//! `versions` uses Cargo's `semver` requirement syntax. Comparators are joined
//! with commas (`">=3.6, <4"`), a bare version is a caret requirement
//! (`"3.6"` means `^3.6`, so `>=3.6.0, <4.0.0`), and `||` alternatives or
//! space-separated comparators are rejected. `"*"` or an omitted key selects
//! every interpreter, pre-releases included. Quote the value, since YAML
//! reads a bare `*` as an alias.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;

use super::config::HarnessContext;
use super::error::HarnessError;
use super::fixtures::DEFINITION_FILE_NAME;
use super::interpreter_set::TrackCoverage;
use super::newtypes::ParserName;
use super::options::OptionOverrides;
use super::suite::{Suite, run_spec};
use super::version::VersionRange;

/// A parsed definition file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteDefinition {
    /// Parsers to run; the first is the primary parser.
    pub parsers: Vec<ParserName>,
    /// Interpreter versions to run under. Defaults to every version.
    #[serde(default)]
    pub versions: VersionRange,
    /// Whether every interpreter track must be present.
    #[serde(default)]
    pub coverage: TrackCoverage,
    /// Option overrides applied on top of the defaults.
    #[serde(default)]
    pub options: OptionOverrides,
}

/// Parses definition text, attributing errors to `path`.
///
/// # Errors
///
/// Returns [`HarnessError::Definition`] if the YAML is malformed, names an
/// unknown key, or holds an invalid parser name or version range.
pub fn parse_definition(path: &Utf8Path, yaml: &str) -> Result<SuiteDefinition, HarnessError> {
    serde_saphyr::from_str(yaml).map_err(|error| HarnessError::Definition {
        path: path.to_owned(),
        message: error.to_string(),
    })
}

/// Reads and parses the definition file in `dir`.
///
/// # Errors
///
/// Returns [`HarnessError::Io`] if the file cannot be read and
/// [`HarnessError::Definition`] if it cannot be parsed.
pub fn load_definition(dir: &Utf8Path) -> Result<SuiteDefinition, HarnessError> {
    let path: Utf8PathBuf = dir.join(DEFINITION_FILE_NAME);
    let io_error = |source| HarnessError::Io {
        path: path.clone(),
        source,
    };
    let handle = Dir::open_ambient_dir(dir, ambient_authority()).map_err(io_error)?;
    let yaml = handle
        .read_to_string(DEFINITION_FILE_NAME)
        .map_err(io_error)?;
    parse_definition(&path, &yaml)
}

/// Registers the suite declared by the definition file in `dir`.
///
/// # Errors
///
/// Returns any error from [`load_definition`] or [`run_spec`].
pub fn run_definition(ctx: &HarnessContext<'_>, dir: &Utf8Path) -> Result<Suite, HarnessError> {
    let definition = load_definition(dir)?;
    run_spec(
        ctx,
        dir,
        &definition.parsers,
        &definition.versions,
        definition.coverage,
        &definition.options,
    )
}
