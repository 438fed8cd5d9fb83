//! Fixture discovery and loading.
//!
//! A fixture directory holds sample sources, the snapshot artifacts recorded
//! for them, and a [`DEFINITION_FILE_NAME`] describing how to run them. Only
//! the samples are fixtures.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::debug;

use super::error::HarnessError;

/// Extension of snapshot artifacts, never treated as fixtures.
pub const SNAPSHOT_EXTENSION: &str = "snap";

/// Leading character of hidden files.
pub const HIDDEN_PREFIX: char = '.';

/// Name of the per-directory definition file.
pub const DEFINITION_FILE_NAME: &str = "fmtspec.yaml";

/// Lists the fixtures directly inside `dir`, in directory iteration order.
///
/// Entries are skipped when they carry the [`SNAPSHOT_EXTENSION`], are not
/// regular files (directories and symlinks alike, since entry types are not
/// followed), start with [`HIDDEN_PREFIX`], or are the
/// [`DEFINITION_FILE_NAME`]. Entries whose names are not valid UTF-8 are
/// skipped. Subdirectories are not searched.
///
/// # Errors
///
/// Returns [`HarnessError::Io`] if the directory or one of its entries cannot
/// be read.
pub fn enumerate_fixtures(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, HarnessError> {
    let io_error = |source| HarnessError::Io {
        path: dir.to_owned(),
        source,
    };
    let handle = Dir::open_ambient_dir(dir, ambient_authority()).map_err(io_error)?;

    let mut fixtures = Vec::new();
    for item in handle.entries().map_err(io_error)? {
        let entry = item.map_err(io_error)?;
        let name = match entry.file_name() {
            Ok(name) => name,
            Err(error) => {
                debug!(%dir, %error, "skipping entry with undecodable name");
                continue;
            }
        };
        let is_file = entry.file_type().map_err(io_error)?.is_file();
        if is_fixture_name(&name) && is_file {
            fixtures.push(dir.join(&name));
        } else {
            debug!(%dir, entry = %name, "skipping non-fixture entry");
        }
    }
    Ok(fixtures)
}

fn is_fixture_name(name: &str) -> bool {
    Utf8Path::new(name).extension() != Some(SNAPSHOT_EXTENSION)
        && !name.starts_with(HIDDEN_PREFIX)
        && name != DEFINITION_FILE_NAME
}

/// Converts `\r\n` line endings to `\n`.
#[must_use]
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// A fixture's path and its line-ending-normalized source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    path: Utf8PathBuf,
    source: String,
}

impl Fixture {
    /// Reads a fixture from disk as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] if the file cannot be read or is not
    /// valid UTF-8.
    pub fn load(path: &Utf8Path) -> Result<Self, HarnessError> {
        let io_error = |source| HarnessError::Io {
            path: path.to_owned(),
            source,
        };
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let file_name = path.file_name().unwrap_or(path.as_str());
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
        let text = dir.read_to_string(file_name).map_err(io_error)?;
        Ok(Self::from_source(path.to_owned(), &text))
    }

    /// Builds a fixture from in-memory text, normalizing line endings.
    #[must_use]
    pub fn from_source(path: Utf8PathBuf, text: &str) -> Self {
        Self {
            path,
            source: normalize_line_endings(text),
        }
    }

    /// The fixture path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The fixture's file name, used for unit names and snapshot keys.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or(self.path.as_str())
    }

    /// The normalized source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}
