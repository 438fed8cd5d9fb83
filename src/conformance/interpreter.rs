//! Interpreter discovery.
//!
//! Each [`VersionTrack`] names an ordered list of candidate executables and
//! the version requirement they must meet. [`resolve`] probes candidates in
//! order and binds the first that satisfies the requirement. Discovery spawns
//! processes, so [`ResolvedInterpreters::host`] memoizes it for the lifetime
//! of the process and callers pass the result around explicitly.

use std::fmt;
use std::process::Command;
use std::sync::OnceLock;

use semver::{Comparator, Op, Prerelease, Version, VersionReq};
use tracing::{debug, info};

use super::error::ProbeError;
use super::version::parse_reported_version;

/// Script passed to `<bin> -c` to print a bare version string.
pub const VERSION_PROBE_SCRIPT: &str = "import platform; print(platform.python_version())";

/// Asks an executable which version it is.
pub trait VersionProbe {
    /// Returns the raw version string reported by `executable`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] when the executable cannot be run or reports
    /// failure; callers treat that as "not installed".
    fn probe(&self, executable: &str) -> Result<String, ProbeError>;
}

/// Probes executables by running `<bin> -c "<script>"` and reading stdout.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    script: String,
}

impl CommandProbe {
    /// Creates a probe that runs a custom script instead of
    /// [`VERSION_PROBE_SCRIPT`].
    #[must_use]
    pub fn with_script(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl Default for CommandProbe {
    fn default() -> Self {
        Self::with_script(VERSION_PROBE_SCRIPT)
    }
}

impl VersionProbe for CommandProbe {
    fn probe(&self, executable: &str) -> Result<String, ProbeError> {
        let output = Command::new(executable)
            .arg("-c")
            .arg(&self.script)
            .output()
            .map_err(|source| ProbeError::Spawn {
                executable: executable.to_owned(),
                source,
            })?;
        if !output.status.success() {
            return Err(ProbeError::Exit {
                executable: executable.to_owned(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}

/// An interpreter executable bound to the version it reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterpreterBinding {
    /// Executable name or path, as it was probed.
    pub executable: String,
    /// The version the executable reported.
    pub version: Version,
}

impl fmt::Display for InterpreterBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.executable, self.version)
    }
}

/// One interpreter major-version lineage that may coexist with others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTrack {
    /// Human-readable track name used in check failures.
    pub name: String,
    /// Candidate executables in preference order.
    pub candidates: Vec<String>,
    /// Requirement the reported version must satisfy.
    pub constraint: VersionReq,
}

impl VersionTrack {
    /// Creates a track from borrowed candidate names.
    #[must_use]
    pub fn new(name: impl Into<String>, candidates: &[&str], constraint: VersionReq) -> Self {
        Self {
            name: name.into(),
            candidates: candidates.iter().map(|&c| c.to_owned()).collect(),
            constraint,
        }
    }

    /// The Python 2 lineage: `python2`, then `python`, at `>=2.7.0, <3.0.0`.
    #[must_use]
    pub fn python2() -> Self {
        let constraint = VersionReq {
            comparators: vec![comparator(Op::GreaterEq, 2, 7), comparator(Op::Less, 3, 0)],
        };
        Self::new("python2", &["python2", "python"], constraint)
    }

    /// The Python 3 lineage: `python3`, then `python`, at `>=3.0.0`.
    #[must_use]
    pub fn python3() -> Self {
        let constraint = VersionReq {
            comparators: vec![comparator(Op::GreaterEq, 3, 0)],
        };
        Self::new("python3", &["python3", "python"], constraint)
    }

    /// The default tracks, in the order their bindings are reported.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![Self::python2(), Self::python3()]
    }
}

const fn comparator(op: Op, major: u64, minor: u64) -> Comparator {
    Comparator {
        op,
        major,
        minor: Some(minor),
        patch: Some(0),
        pre: Prerelease::EMPTY,
    }
}

/// Binds the first candidate whose reported version satisfies `constraint`.
///
/// Candidates are probed in order, one blocking spawn each. A candidate that
/// fails to run or prints an unparsable version is skipped for this call and
/// never retried. Returns `None` when no candidate qualifies.
#[must_use]
pub fn resolve(
    candidates: &[String],
    constraint: &VersionReq,
    probe: &dyn VersionProbe,
) -> Option<InterpreterBinding> {
    for executable in candidates {
        let raw = match probe.probe(executable) {
            Ok(raw) => raw,
            Err(error) => {
                debug!(%executable, %error, "interpreter candidate unavailable");
                continue;
            }
        };
        let Some(version) = parse_reported_version(&raw) else {
            debug!(%executable, reported = %raw, "unparsable interpreter version");
            continue;
        };
        if constraint.matches(&version) {
            return Some(InterpreterBinding {
                executable: executable.clone(),
                version,
            });
        }
        debug!(
            %executable,
            %version,
            %constraint,
            "interpreter version outside track constraint"
        );
    }
    None
}

/// The outcome of resolving one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    /// The track name.
    pub track: String,
    /// The bound interpreter, if any candidate qualified.
    pub binding: Option<InterpreterBinding>,
}

/// Resolution results for every track, in track order. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedInterpreters {
    tracks: Vec<ResolvedTrack>,
}

static HOST: OnceLock<ResolvedInterpreters> = OnceLock::new();

impl ResolvedInterpreters {
    /// Resolves every track once using `probe`.
    #[must_use]
    pub fn detect(tracks: &[VersionTrack], probe: &dyn VersionProbe) -> Self {
        let resolved = tracks
            .iter()
            .map(|track| {
                let binding = resolve(&track.candidates, &track.constraint, probe);
                match &binding {
                    Some(found) => {
                        info!(track = %track.name, interpreter = %found, "resolved interpreter");
                    }
                    None => info!(track = %track.name, "no interpreter satisfies track"),
                }
                ResolvedTrack {
                    track: track.name.clone(),
                    binding,
                }
            })
            .collect();
        Self { tracks: resolved }
    }

    /// Builds a result from already-resolved tracks.
    #[must_use]
    pub const fn from_tracks(tracks: Vec<ResolvedTrack>) -> Self {
        Self { tracks }
    }

    /// Resolves `tracks` into `cell` on first use and returns the cached
    /// result afterwards without probing again.
    #[must_use]
    pub fn detect_once<'a>(
        cell: &'a OnceLock<Self>,
        tracks: &[VersionTrack],
        probe: &dyn VersionProbe,
    ) -> &'a Self {
        cell.get_or_init(|| Self::detect(tracks, probe))
    }

    /// Interpreters installed on this host for the default tracks.
    ///
    /// The first call probes the host with [`CommandProbe`]; later calls,
    /// from any thread, return the same result without spawning anything.
    #[must_use]
    pub fn host() -> &'static Self {
        Self::detect_once(&HOST, &VersionTrack::defaults(), &CommandProbe::default())
    }

    /// Returns the per-track results in track order.
    #[must_use]
    pub fn tracks(&self) -> &[ResolvedTrack] {
        &self.tracks
    }

    /// Iterates the bindings that resolved, in track order.
    pub fn bindings(&self) -> impl Iterator<Item = &InterpreterBinding> {
        self.tracks.iter().filter_map(|t| t.binding.as_ref())
    }

    /// Names of tracks that did not resolve.
    #[must_use]
    pub fn missing_tracks(&self) -> Vec<String> {
        self.tracks
            .iter()
            .filter(|t| t.binding.is_none())
            .map(|t| t.track.clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod tests;
