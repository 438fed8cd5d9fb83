//! Snapshot values and the stores that compare them against baselines.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

use super::error::CaseFailure;

/// Width of the separator line between source and output.
pub const SEPARATOR_WIDTH: usize = 80;

/// Character the separator line is made of.
pub const SEPARATOR_CHAR: char = '~';

/// A snapshot value stored verbatim, without quoting or escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSnapshot(String);

impl RawSnapshot {
    /// The stored text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Joins a fixture's source and its formatted output for storage.
///
/// The layout is the source, a line of [`SEPARATOR_WIDTH`]
/// [`SEPARATOR_CHAR`]s followed by a newline, then the output. Sources end
/// with their own newline, so the separator normally starts a line.
#[must_use]
pub fn compose_snapshot(source: &str, output: &str) -> RawSnapshot {
    let separator: String = std::iter::repeat_n(SEPARATOR_CHAR, SEPARATOR_WIDTH).collect();
    RawSnapshot(format!("{source}{separator}\n{output}"))
}

/// Compares named snapshot values against stored baselines.
pub trait SnapshotStore {
    /// Records `content` under `name`, or compares it with the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`CaseFailure::Snapshot`] when the stored value differs.
    fn record(&mut self, name: &str, content: &RawSnapshot) -> Result<(), CaseFailure>;
}

/// A store holding baselines in memory for the lifetime of a run.
///
/// The first value recorded under a name becomes its baseline; later values
/// must match it. Useful for checking that every interpreter produces the
/// same output before anything is written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: IndexMap<String, String>,
}

impl MemoryStore {
    /// Creates a store pre-loaded with baselines.
    #[must_use]
    pub fn with_baselines<I, K, V>(baselines: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: baselines
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The stored value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn record(&mut self, name: &str, content: &RawSnapshot) -> Result<(), CaseFailure> {
        match self.entries.get(name) {
            Some(stored) if stored == content.as_str() => Ok(()),
            Some(stored) => Err(CaseFailure::Snapshot {
                name: name.to_owned(),
                message: format!("expected:\n{stored}\nactual:\n{content}"),
            }),
            None => {
                self.entries.insert(name.to_owned(), content.as_str().to_owned());
                Ok(())
            }
        }
    }
}

/// A store backed by `insta` snapshot files in one directory.
///
/// Mismatches follow `insta`'s review workflow (`INSTA_UPDATE`,
/// `cargo insta review`); the assertion panic is reported as a
/// [`CaseFailure::Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstaStore {
    snapshot_dir: Utf8PathBuf,
}

impl InstaStore {
    /// Name of the snapshot directory inside a fixture directory.
    pub const DIR_NAME: &'static str = "__snapshots__";

    /// Stores snapshots in `snapshot_dir`.
    ///
    /// Relative paths are made absolute against the current directory, since
    /// `insta` would otherwise resolve them against this source file.
    #[must_use]
    pub fn new(snapshot_dir: impl AsRef<Utf8Path>) -> Self {
        let dir = snapshot_dir.as_ref();
        let absolute = std::path::absolute(dir)
            .ok()
            .and_then(|path| Utf8PathBuf::try_from(path).ok())
            .unwrap_or_else(|| dir.to_owned());
        Self {
            snapshot_dir: absolute,
        }
    }

    /// Stores snapshots in [`InstaStore::DIR_NAME`] under a fixture directory.
    #[must_use]
    pub fn for_fixture_dir(dir: impl AsRef<Utf8Path>) -> Self {
        Self::new(dir.as_ref().join(Self::DIR_NAME))
    }

    /// The directory snapshot files are written to.
    #[must_use]
    pub fn snapshot_dir(&self) -> &Utf8Path {
        &self.snapshot_dir
    }
}

impl SnapshotStore for InstaStore {
    fn record(&mut self, name: &str, content: &RawSnapshot) -> Result<(), CaseFailure> {
        let mut settings = insta::Settings::clone_current();
        settings.set_snapshot_path(self.snapshot_dir.as_std_path());
        settings.set_prepend_module_to_snapshot(false);
        settings.set_omit_expression(true);
        panic::catch_unwind(AssertUnwindSafe(|| {
            settings.bind(|| insta::assert_snapshot!(name, content.as_str()));
        }))
        .map_err(|payload| CaseFailure::Snapshot {
            name: name.to_owned(),
            message: super::suite::panic_message(payload.as_ref()),
        })
    }
}
