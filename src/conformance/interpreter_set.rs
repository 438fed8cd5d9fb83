//! The working set of interpreters a suite runs against.

use serde::Deserialize;

use super::error::CaseFailure;
use super::interpreter::{InterpreterBinding, ResolvedInterpreters};
use super::version::VersionRange;

/// Unit name of the check that at least one interpreter is usable.
pub const AT_LEAST_ONE_CHECK: &str = "at least one valid interpreter version";

/// Unit name of the check that every track resolved.
pub const ALL_TRACKS_CHECK: &str = "all interpreter tracks available";

/// How much cross-version coverage a suite demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackCoverage {
    /// Any single usable interpreter is enough.
    #[default]
    Any,
    /// Every track must resolve; missing tracks fail a dedicated check.
    All,
}

/// A check registered alongside the fixture units.
#[derive(Debug, Clone, PartialEq)]
pub struct SetCheck {
    /// The unit name.
    pub name: &'static str,
    /// The outcome, already known once the set is built.
    pub outcome: Result<(), CaseFailure>,
}

/// Interpreters selected for a suite plus the checks describing coverage.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterSet {
    /// Selected bindings in track order, deduplicated by executable.
    pub bindings: Vec<InterpreterBinding>,
    /// Coverage checks, in registration order.
    pub checks: Vec<SetCheck>,
}

/// Selects the resolved interpreters whose version lies in `range`.
///
/// Bindings keep track order and are deduplicated by executable. An empty
/// selection is not an error here: it yields zero fixture units, while the
/// always-registered [`AT_LEAST_ONE_CHECK`] fails. The [`ALL_TRACKS_CHECK`]
/// is registered only for [`TrackCoverage::All`].
#[must_use]
pub fn build_set(
    resolved: &ResolvedInterpreters,
    range: &VersionRange,
    coverage: TrackCoverage,
) -> InterpreterSet {
    let mut bindings: Vec<InterpreterBinding> = Vec::new();
    for binding in resolved.bindings() {
        let duplicate = bindings.iter().any(|b| b.executable == binding.executable);
        if !duplicate && range.matches(&binding.version) {
            bindings.push(binding.clone());
        }
    }

    let mut checks = vec![SetCheck {
        name: AT_LEAST_ONE_CHECK,
        outcome: if bindings.is_empty() {
            Err(CaseFailure::NoInterpreter {
                range: range.to_string(),
            })
        } else {
            Ok(())
        },
    }];
    if coverage == TrackCoverage::All {
        let missing = resolved.missing_tracks();
        checks.push(SetCheck {
            name: ALL_TRACKS_CHECK,
            outcome: if missing.is_empty() {
                Ok(())
            } else {
                Err(CaseFailure::MissingTracks { missing })
            },
        });
    }

    InterpreterSet { bindings, checks }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use semver::Version;

    use super::*;
    use crate::conformance::interpreter::ResolvedTrack;

    fn track(name: &str, binding: Option<(&str, &str)>) -> ResolvedTrack {
        ResolvedTrack {
            track: name.to_owned(),
            binding: binding.map(|(exe, version)| InterpreterBinding {
                executable: exe.to_owned(),
                version: Version::parse(version).expect("valid test version"),
            }),
        }
    }

    fn executables(set: &InterpreterSet) -> Vec<&str> {
        set.bindings.iter().map(|b| b.executable.as_str()).collect()
    }

    #[rstest]
    fn both_tracks_kept_in_track_order() {
        let resolved = ResolvedInterpreters::from_tracks(vec![
            track("python2", Some(("python2", "2.7.18"))),
            track("python3", Some(("python3", "3.11.4"))),
        ]);
        let set = build_set(&resolved, &VersionRange::Any, TrackCoverage::All);
        assert_eq!(executables(&set), vec!["python2", "python3"]);
        assert!(set.checks.iter().all(|c| c.outcome.is_ok()));
        assert_eq!(set.checks.len(), 2);
    }

    #[rstest]
    fn range_narrows_the_set() {
        let resolved = ResolvedInterpreters::from_tracks(vec![
            track("python2", Some(("python2", "2.7.18"))),
            track("python3", Some(("python3", "3.11.4"))),
        ]);
        let range = VersionRange::parse(">=3.6").expect("range should parse");
        let set = build_set(&resolved, &range, TrackCoverage::Any);
        assert_eq!(executables(&set), vec!["python3"]);
        assert_eq!(set.checks.len(), 1);
    }

    #[rstest]
    fn shared_executable_is_deduplicated() {
        let resolved = ResolvedInterpreters::from_tracks(vec![
            track("a", Some(("python", "3.11.4"))),
            track("b", Some(("python", "3.11.4"))),
        ]);
        let set = build_set(&resolved, &VersionRange::Any, TrackCoverage::Any);
        assert_eq!(executables(&set), vec!["python"]);
    }

    #[rstest]
    fn empty_set_fails_the_at_least_one_check() {
        let resolved = ResolvedInterpreters::from_tracks(vec![
            track("python2", None),
            track("python3", None),
        ]);
        let set = build_set(&resolved, &VersionRange::Any, TrackCoverage::Any);
        assert!(set.bindings.is_empty());
        assert_eq!(
            set.checks.first().map(|c| c.outcome.clone()),
            Some(Err(CaseFailure::NoInterpreter {
                range: "*".to_owned()
            }))
        );
    }

    #[rstest]
    fn missing_track_fails_only_the_coverage_check() {
        let resolved = ResolvedInterpreters::from_tracks(vec![
            track("python2", None),
            track("python3", Some(("python3", "3.11.4"))),
        ]);
        let set = build_set(&resolved, &VersionRange::Any, TrackCoverage::All);
        assert_eq!(executables(&set), vec!["python3"]);
        let outcomes: Vec<_> = set.checks.iter().map(|c| (c.name, c.outcome.clone())).collect();
        assert_eq!(
            outcomes,
            vec![
                (AT_LEAST_ONE_CHECK, Ok(())),
                (
                    ALL_TRACKS_CHECK,
                    Err(CaseFailure::MissingTracks {
                        missing: vec!["python2".to_owned()]
                    })
                ),
            ]
        );
    }
}
