//! Formatter option sets and their merge order.
//!
//! Options are layered: built-in defaults, then caller overrides, then the
//! fields derived for each run (parser, interpreter, fixture path). Only the
//! last layer produces [`ResolvedOptions`], which is what the formatter sees.
//! The harness never validates passthrough options; the formatter does.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use super::interpreter::InterpreterBinding;
use super::newtypes::ParserName;
use super::value::OptionValue;

/// Default plugin discovery root.
pub const DEFAULT_PLUGIN_ROOT: &str = ".";

/// Passthrough keys owned by the derived layer; overrides cannot set them.
pub const DERIVED_KEYS: [&str; 3] = ["parser", "interpreter", "filepath"];

/// Options supplied by a caller or a definition file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptionOverrides {
    /// Plugin discovery roots replacing the default.
    #[serde(default, alias = "plugins")]
    pub plugin_search_dirs: Option<Vec<Utf8PathBuf>>,
    /// Formatter-specific options forwarded verbatim.
    #[serde(flatten)]
    pub passthrough: IndexMap<String, OptionValue>,
}

impl OptionOverrides {
    /// Adds a passthrough option.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.passthrough.insert(key.into(), value.into());
        self
    }
}

/// Defaults merged with caller overrides; not yet bound to a run.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    /// Plugin discovery roots.
    pub plugin_search_dirs: Vec<Utf8PathBuf>,
    /// Formatter-specific options forwarded verbatim.
    pub passthrough: IndexMap<String, OptionValue>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            plugin_search_dirs: vec![Utf8PathBuf::from(DEFAULT_PLUGIN_ROOT)],
            passthrough: IndexMap::new(),
        }
    }
}

impl FormatOptions {
    /// Applies `overrides` on top of the defaults.
    #[must_use]
    pub fn merged(overrides: &OptionOverrides) -> Self {
        let mut options = Self::default();
        if let Some(dirs) = &overrides.plugin_search_dirs {
            options.plugin_search_dirs.clone_from(dirs);
        }
        for (key, value) in &overrides.passthrough {
            if DERIVED_KEYS.contains(&key.as_str()) {
                debug!(option = %key, "ignoring override of a derived option");
                continue;
            }
            options.passthrough.insert(key.clone(), value.clone());
        }
        options
    }

    /// Binds these options to one parser, one interpreter and one file.
    #[must_use]
    pub fn resolve(
        &self,
        parser: ParserName,
        interpreter: InterpreterBinding,
        file_path: &Utf8Path,
    ) -> ResolvedOptions {
        ResolvedOptions {
            base: self.clone(),
            parser,
            interpreter,
            file_path: file_path.to_owned(),
        }
    }
}

/// The complete option set for a single format or parse call.
///
/// Holds exactly one parser and exactly one interpreter binding by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    /// Defaults and caller overrides.
    pub base: FormatOptions,
    /// The selected parser.
    pub parser: ParserName,
    /// The selected interpreter.
    pub interpreter: InterpreterBinding,
    /// The fixture path, for formatters that infer behaviour from it.
    pub file_path: Utf8PathBuf,
}

impl ResolvedOptions {
    /// Returns a copy that differs only in the selected parser.
    #[must_use]
    pub fn with_parser(&self, parser: ParserName) -> Self {
        Self {
            parser,
            ..self.clone()
        }
    }
}
