//! Suite registration and execution.
//!
//! [`run_spec`] turns a fixture directory into a [`Suite`] of independent
//! units; [`Suite::run`] executes them against a formatter. A unit covers one
//! fixture under one interpreter and one parser, and its failure never stops
//! its siblings from running.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use super::config::HarnessContext;
use super::error::{CaseFailure, HarnessError};
use super::fixtures::{Fixture, enumerate_fixtures};
use super::formatter::{Formatter, format_fixture};
use super::interpreter_set::{SetCheck, TrackCoverage, build_set};
use super::newtypes::ParserName;
use super::options::{FormatOptions, OptionOverrides, ResolvedOptions};
use super::snapshot::{SnapshotStore, compose_snapshot};
use super::verify::{round_trip, verify_alternate_parser};
use super::version::VersionRange;

/// One fixture bound to one interpreter under the primary parser.
///
/// A fixture that could not be read keeps its case; every unit of the case
/// then fails with the read error.
#[derive(Debug, Clone)]
struct FixtureCase {
    file_name: String,
    fixture: Result<Fixture, CaseFailure>,
    options: ResolvedOptions,
}

impl FixtureCase {
    fn unit_name(&self, parser: &ParserName, check: &str) -> String {
        format!(
            "{} - {parser}-{check} [{}]",
            self.file_name, self.options.interpreter
        )
    }
}

fn load_fixture(path: &Utf8Path) -> Result<Fixture, CaseFailure> {
    Fixture::load(path).map_err(|error| {
        warn!(fixture = %path, %error, "fixture could not be read");
        CaseFailure::Unreadable {
            fixture: path.file_name().unwrap_or(path.as_str()).to_owned(),
            message: error.to_string(),
        }
    })
}

/// The registered units for one fixture directory.
#[derive(Debug, Clone)]
pub struct Suite {
    dir: Utf8PathBuf,
    checks: Vec<SetCheck>,
    cases: Vec<FixtureCase>,
    alternates: Vec<ParserName>,
    ast_compare: bool,
}

/// Registers the conformance units for the fixtures in `dir`.
///
/// The first parser is the primary parser: each fixture is formatted with it
/// once per selected interpreter and the result is recorded as a snapshot.
/// Every other parser must reproduce that output exactly. With
/// [`HarnessConfig::ast_compare`](super::config::HarnessConfig::ast_compare)
/// set, a structural round-trip unit is added per fixture and interpreter.
///
/// # Errors
///
/// Returns [`HarnessError::NoParsers`] before doing anything else when
/// `parsers` is empty, and [`HarnessError::Io`] when the directory cannot be
/// listed. An unreadable fixture only fails its own units.
pub fn run_spec(
    ctx: &HarnessContext<'_>,
    dir: &Utf8Path,
    parsers: &[ParserName],
    versions: &VersionRange,
    coverage: TrackCoverage,
    overrides: &OptionOverrides,
) -> Result<Suite, HarnessError> {
    let Some((primary, alternates)) = parsers.split_first() else {
        return Err(HarnessError::NoParsers {
            dir: dir.to_owned(),
        });
    };
    let set = build_set(ctx.interpreters, versions, coverage);
    let base = FormatOptions::merged(overrides);

    let mut cases = Vec::new();
    for path in enumerate_fixtures(dir)? {
        let fixture = load_fixture(&path);
        let file_name = path.file_name().unwrap_or(path.as_str());
        for binding in &set.bindings {
            cases.push(FixtureCase {
                file_name: file_name.to_owned(),
                fixture: fixture.clone(),
                options: base.resolve(primary.clone(), binding.clone(), &path),
            });
        }
    }

    info!(
        %dir,
        %versions,
        interpreters = set.bindings.len(),
        cases = cases.len(),
        parsers = parsers.len(),
        ast_compare = ctx.config.ast_compare,
        "registered conformance suite"
    );
    Ok(Suite {
        dir: dir.to_owned(),
        checks: set.checks,
        cases,
        alternates: alternates.to_vec(),
        ast_compare: ctx.config.ast_compare,
    })
}

impl Suite {
    /// The fixture directory this suite was registered for.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Names of every registered unit, in execution order.
    #[must_use]
    pub fn unit_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.checks.iter().map(|c| c.name.to_owned()).collect();
        for case in &self.cases {
            names.push(case.unit_name(&case.options.parser, "verify"));
            for parser in &self.alternates {
                names.push(case.unit_name(parser, "verify"));
            }
            if self.ast_compare {
                names.push(case.unit_name(&case.options.parser, "ast-compare"));
            }
        }
        names
    }

    /// Executes every unit and collects the outcomes.
    ///
    /// The primary output of each case is computed once and shared by the
    /// snapshot, alternate-parser and round-trip units of that case.
    pub fn run(&self, formatter: &dyn Formatter, store: &mut dyn SnapshotStore) -> SuiteReport {
        let mut outcomes: Vec<UnitOutcome> = self
            .checks
            .iter()
            .map(|check| UnitOutcome {
                name: check.name.to_owned(),
                result: check.outcome.clone(),
            })
            .collect();

        for case in &self.cases {
            let primary = case.fixture.clone().and_then(|fixture| {
                let output = isolate(|| {
                    format_fixture(formatter, &fixture, &case.options).map_err(|error| {
                        CaseFailure::Format {
                            fixture: case.file_name.clone(),
                            message: error.to_string(),
                        }
                    })
                })?;
                Ok((fixture, output))
            });

            let snapshot = primary.as_ref().map_err(Clone::clone).and_then(|(fixture, output)| {
                isolate(|| {
                    store.record(&case.file_name, &compose_snapshot(fixture.source(), output))
                })
            });
            outcomes.push(UnitOutcome::new(
                case.unit_name(&case.options.parser, "verify"),
                snapshot,
            ));

            for parser in &self.alternates {
                let result = primary.as_ref().map_err(Clone::clone).and_then(|(fixture, output)| {
                    isolate(|| {
                        verify_alternate_parser(formatter, fixture, &case.options, output, parser)
                    })
                });
                outcomes.push(UnitOutcome::new(case.unit_name(parser, "verify"), result));
            }

            if self.ast_compare {
                let result = primary.as_ref().map_err(Clone::clone).and_then(|(fixture, output)| {
                    isolate(|| round_trip(formatter, fixture, &case.options, output)?.check())
                });
                outcomes.push(UnitOutcome::new(
                    case.unit_name(&case.options.parser, "ast-compare"),
                    result,
                ));
            }
        }

        let report = SuiteReport {
            dir: self.dir.clone(),
            outcomes,
        };
        info!(
            dir = %self.dir,
            units = report.outcomes.len(),
            failed = report.failures().count(),
            "conformance suite finished"
        );
        report
    }
}

fn isolate<T>(body: impl FnOnce() -> Result<T, CaseFailure>) -> Result<T, CaseFailure> {
    panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| {
        Err(CaseFailure::Panicked {
            message: panic_message(payload.as_ref()),
        })
    })
}

/// Extracts the message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

/// The result of one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutcome {
    /// The unit name.
    pub name: String,
    /// `Ok` if the unit passed.
    pub result: Result<(), CaseFailure>,
}

impl UnitOutcome {
    fn new(name: String, result: Result<(), CaseFailure>) -> Self {
        if let Err(failure) = &result {
            warn!(unit = %name, %failure, "conformance unit failed");
        }
        Self { name, result }
    }

    /// Returns `true` if the unit passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a suite run, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteReport {
    /// The fixture directory.
    pub dir: Utf8PathBuf,
    /// One outcome per unit.
    pub outcomes: Vec<UnitOutcome>,
}

impl SuiteReport {
    /// The failed units.
    pub fn failures(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    /// Returns `true` if every unit passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(UnitOutcome::passed)
    }

    /// The outcome of the unit called `name`.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&UnitOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    /// Converts the report into an error listing the failed units.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnitsFailed`] if any unit failed.
    pub fn into_result(self) -> Result<(), HarnessError> {
        let failed: Vec<String> = self
            .failures()
            .map(|o| match &o.result {
                Err(failure) => format!("{}: {failure}", o.name),
                Ok(()) => o.name.clone(),
            })
            .collect();
        if failed.is_empty() {
            return Ok(());
        }
        Err(HarnessError::UnitsFailed {
            failed: failed.len(),
            total: self.outcomes.len(),
            summary: failed.join("\n"),
        })
    }
}
