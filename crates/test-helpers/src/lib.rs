//! Shared test helpers for integration tests.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// A throwaway fixture directory populated file by file.
#[derive(Debug)]
pub struct FixtureDir {
    _root: TempDir,
    path: Utf8PathBuf,
}

impl FixtureDir {
    /// Creates an empty fixture directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created or its path is not
    /// valid UTF-8.
    #[must_use]
    pub fn new() -> Self {
        let root = TempDir::new().unwrap_or_else(|e| panic!("failed to create temp dir: {e}"));
        let path = Utf8PathBuf::from_path_buf(root.path().to_path_buf())
            .unwrap_or_else(|p| panic!("temp dir is not UTF-8: {}", p.display()));
        Self { _root: root, path }
    }

    /// Adds a file, creating parent directories as needed.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn with_file(self, name: &str, contents: &str) -> Self {
        let target = self.path.join(name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("failed to create {parent}: {e}"));
        }
        fs::write(&target, contents).unwrap_or_else(|e| panic!("failed to write {target}: {e}"));
        self
    }

    /// Adds a file holding raw bytes, which need not be valid UTF-8.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn with_bytes(self, name: &str, contents: &[u8]) -> Self {
        let target = self.path.join(name);
        fs::write(&target, contents).unwrap_or_else(|e| panic!("failed to write {target}: {e}"));
        self
    }

    /// Adds an empty subdirectory.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    #[must_use]
    pub fn with_dir(self, name: &str) -> Self {
        let target = self.path.join(name);
        fs::create_dir_all(&target).unwrap_or_else(|e| panic!("failed to create {target}: {e}"));
        self
    }

    /// Adds a symbolic link named `name` pointing at `target`.
    ///
    /// # Panics
    ///
    /// Panics if the link cannot be created.
    #[cfg(unix)]
    #[must_use]
    pub fn with_symlink(self, name: &str, target: &str) -> Self {
        let link = self.path.join(name);
        std::os::unix::fs::symlink(target, &link)
            .unwrap_or_else(|e| panic!("failed to link {link}: {e}"));
        self
    }

    /// The directory path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}

/// The path of a checked-in fixture directory under `tests/fixtures/`.
#[must_use]
pub fn fixture_dir(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from("tests/fixtures").join(name)
}
