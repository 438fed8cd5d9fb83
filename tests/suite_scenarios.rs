//! End-to-end suite scenarios driven by a toy formatter.

mod common;

use camino::Utf8Path;
use common::{ToyFormatter, both_tracks, interpreters, parsers, python3_only};
use fmtconform::conformance::{
    ALL_TRACKS_CHECK, AT_LEAST_ONE_CHECK, CaseFailure, HarnessConfig, HarnessContext,
    HarnessError, InstaStore, MemoryStore, OptionOverrides, ResolvedInterpreters,
    SuiteReport, TrackCoverage, VersionRange, compose_snapshot, enumerate_fixtures,
    run_definition, run_spec,
};
use rstest::{fixture, rstest};
use test_helpers::{FixtureDir, fixture_dir};

const VALID: &str = "x=1\ny   =  2\n";
const INVALID: &str = "x=1\nthis   is not valid\n";

#[fixture]
fn mixed_dir() -> FixtureDir {
    FixtureDir::new()
        .with_file("a.txt", VALID)
        .with_file("b.txt", INVALID)
        .with_file(".hidden", "ignored\n")
        .with_file("results.snap", "ignored\n")
}

fn run(
    interpreters: &ResolvedInterpreters,
    dir: &Utf8Path,
    names: &[&str],
    versions: &str,
    coverage: TrackCoverage,
) -> (Vec<String>, SuiteReport, MemoryStore) {
    let config = HarnessConfig::default().with_ast_compare(true);
    let ctx = HarnessContext::new(interpreters, config);
    let range = VersionRange::parse(versions).expect("valid range");
    let suite = run_spec(
        &ctx,
        dir,
        &parsers(names),
        &range,
        coverage,
        &OptionOverrides::default(),
    )
    .expect("suite should register");
    let mut store = MemoryStore::default();
    let report = suite.run(&ToyFormatter, &mut store);
    (suite.unit_names(), report, store)
}

fn failing_units(report: &SuiteReport) -> Vec<&str> {
    report.failures().map(|o| o.name.as_str()).collect()
}

#[rstest]
fn mixed_directory_passes_every_unit(mixed_dir: FixtureDir) {
    let mut found: Vec<String> = enumerate_fixtures(mixed_dir.path())
        .expect("should enumerate")
        .iter()
        .filter_map(|p| p.file_name().map(str::to_owned))
        .collect();
    found.sort();
    assert_eq!(found, vec!["a.txt", "b.txt"]);

    let (names, report, store) = run(
        &python3_only(),
        mixed_dir.path(),
        &["toy", "toy-alt"],
        "*",
        TrackCoverage::Any,
    );
    assert_eq!(names.len(), 7, "units: {names:?}");
    assert!(names.contains(&"a.txt - toy-alt-verify [python3 3.11.0]".to_owned()));
    assert!(names.contains(&"b.txt - toy-ast-compare [python3 3.11.0]".to_owned()));
    assert!(report.is_success(), "failures: {:?}", failing_units(&report));

    assert_eq!(
        store.get("a.txt"),
        Some(compose_snapshot(VALID, "x = 1\ny = 2\n").as_str())
    );
    assert_eq!(store.len(), 2);
}

#[rstest]
fn no_installed_interpreter_registers_no_fixture_units(mixed_dir: FixtureDir) {
    let (names, report, store) = run(
        &interpreters(None, None),
        mixed_dir.path(),
        &["toy", "toy-alt"],
        "*",
        TrackCoverage::Any,
    );
    assert_eq!(names, vec![AT_LEAST_ONE_CHECK]);
    assert_eq!(failing_units(&report), vec![AT_LEAST_ONE_CHECK]);
    assert!(store.is_empty());
}

#[rstest]
fn full_coverage_reports_missing_track_but_still_runs(mixed_dir: FixtureDir) {
    let (_, report, _) = run(
        &python3_only(),
        mixed_dir.path(),
        &["toy"],
        "*",
        TrackCoverage::All,
    );
    assert_eq!(failing_units(&report), vec![ALL_TRACKS_CHECK]);
    assert_eq!(
        report.outcome(ALL_TRACKS_CHECK).map(|o| o.result.clone()),
        Some(Err(CaseFailure::MissingTracks {
            missing: vec!["python2".to_owned()],
        }))
    );
    assert!(report.outcome("a.txt - toy-verify [python3 3.11.0]").is_some_and(|o| o.passed()));
}

#[rstest]
fn version_range_filters_interpreters(mixed_dir: FixtureDir) {
    let (names, report, _) = run(
        &both_tracks(),
        mixed_dir.path(),
        &["toy"],
        ">=3.0",
        TrackCoverage::Any,
    );
    assert!(report.is_success());
    assert!(names.iter().all(|name| !name.contains("python2")), "units: {names:?}");

    let (all_names, _, _) = run(
        &both_tracks(),
        mixed_dir.path(),
        &["toy"],
        "*",
        TrackCoverage::Any,
    );
    assert!(all_names.iter().any(|name| name.contains("[python2 2.7.0]")));
}

#[rstest]
fn divergent_parser_fails_only_its_own_units(mixed_dir: FixtureDir) {
    let (_, report, _) = run(
        &python3_only(),
        mixed_dir.path(),
        &["toy", "drifting", "toy-alt"],
        "*",
        TrackCoverage::Any,
    );
    let mut failed = failing_units(&report);
    failed.sort_unstable();
    assert_eq!(
        failed,
        vec![
            "a.txt - drifting-verify [python3 3.11.0]",
            "b.txt - drifting-verify [python3 3.11.0]",
        ]
    );
    let divergence = report
        .outcome("a.txt - drifting-verify [python3 3.11.0]")
        .map(|o| o.result.clone());
    assert!(matches!(
        divergence,
        Some(Err(CaseFailure::ParserDivergence { ref parser, .. })) if parser == "drifting"
    ));
}

#[rstest]
fn panicking_parser_is_isolated(mixed_dir: FixtureDir) {
    let (_, report, _) = run(
        &python3_only(),
        mixed_dir.path(),
        &["toy", "panicky"],
        "*",
        TrackCoverage::Any,
    );
    let panicked = report
        .outcome("a.txt - panicky-verify [python3 3.11.0]")
        .map(|o| o.result.clone());
    assert_eq!(
        panicked,
        Some(Err(CaseFailure::Panicked {
            message: "toy parser crashed".to_owned(),
        }))
    );
    assert!(report.outcome("a.txt - toy-ast-compare [python3 3.11.0]").is_some_and(|o| o.passed()));
}

#[rstest]
fn lossy_formatting_is_a_structural_mismatch() {
    let dir = FixtureDir::new().with_file("a.txt", VALID);
    let (_, report, _) = run(&python3_only(), dir.path(), &["lossy"], "*", TrackCoverage::Any);
    let mismatch = report
        .outcome("a.txt - lossy-ast-compare [python3 3.11.0]")
        .map(|o| o.result.clone());
    assert!(
        matches!(mismatch, Some(Err(CaseFailure::StructuralMismatch { .. }))),
        "unexpected outcome: {mismatch:?}"
    );
}

#[rstest]
fn format_failure_fails_every_unit_of_that_fixture() {
    let dir = FixtureDir::new()
        .with_file("good.txt", VALID)
        .with_file("bad.txt", "x=1!!\n");
    let (_, report, store) = run(
        &python3_only(),
        dir.path(),
        &["toy", "toy-alt"],
        "*",
        TrackCoverage::Any,
    );
    let mut failed = failing_units(&report);
    failed.sort_unstable();
    assert_eq!(
        failed,
        vec![
            "bad.txt - toy-alt-verify [python3 3.11.0]",
            "bad.txt - toy-ast-compare [python3 3.11.0]",
            "bad.txt - toy-verify [python3 3.11.0]",
        ]
    );
    assert!(store.get("good.txt").is_some());
    assert!(store.get("bad.txt").is_none());
}

#[rstest]
fn unreadable_fixture_fails_only_its_own_units() {
    let dir = FixtureDir::new()
        .with_file("good.txt", "x=1\n")
        .with_bytes("latin1.py", b"s = '\xe9'\n");
    let (names, report, store) = run(
        &python3_only(),
        dir.path(),
        &["toy", "toy-alt"],
        "*",
        TrackCoverage::Any,
    );
    assert_eq!(names.len(), 7, "units: {names:?}");

    let mut failed = failing_units(&report);
    failed.sort_unstable();
    assert_eq!(
        failed,
        vec![
            "latin1.py - toy-alt-verify [python3 3.11.0]",
            "latin1.py - toy-ast-compare [python3 3.11.0]",
            "latin1.py - toy-verify [python3 3.11.0]",
        ]
    );
    assert!(matches!(
        report
            .outcome("latin1.py - toy-verify [python3 3.11.0]")
            .map(|o| o.result.clone()),
        Some(Err(CaseFailure::Unreadable { ref fixture, .. })) if fixture == "latin1.py"
    ));
    assert!(store.get("good.txt").is_some());
}

#[rstest]
fn ast_compare_units_are_opt_in(mixed_dir: FixtureDir) {
    let resolved = python3_only();
    let ctx = HarnessContext::new(&resolved, HarnessConfig::default());
    let suite = run_spec(
        &ctx,
        mixed_dir.path(),
        &parsers(&["toy"]),
        &VersionRange::Any,
        TrackCoverage::Any,
        &OptionOverrides::default(),
    )
    .expect("suite should register");
    assert!(suite.unit_names().iter().all(|name| !name.contains("ast-compare")));
}

#[rstest]
fn empty_parser_list_fails_before_touching_the_directory() {
    let resolved = python3_only();
    let ctx = HarnessContext::new(&resolved, HarnessConfig::default());
    let dir = Utf8Path::new("does/not/exist");
    let result = run_spec(
        &ctx,
        dir,
        &[],
        &VersionRange::Any,
        TrackCoverage::Any,
        &OptionOverrides::default(),
    );
    let message = result.err().map(|e| e.to_string()).unwrap_or_default();
    assert!(message.contains("does/not/exist"), "unexpected error: {message}");
}

#[rstest]
fn failed_report_converts_into_an_error(mixed_dir: FixtureDir) {
    let (_, report, _) = run(
        &python3_only(),
        mixed_dir.path(),
        &["toy", "drifting"],
        "*",
        TrackCoverage::Any,
    );
    let error = report.into_result().err();
    assert!(matches!(
        error,
        Some(HarnessError::UnitsFailed { failed: 2, total: 7, .. })
    ));
}

#[rstest]
fn checked_in_definition_matches_stored_snapshots() {
    let resolved = python3_only();
    let ctx = HarnessContext::new(&resolved, HarnessConfig::default().with_ast_compare(true));
    let dir = fixture_dir("toy");
    let suite = run_definition(&ctx, &dir).expect("definition should load");
    let mut store = InstaStore::for_fixture_dir(&dir);
    let report = suite.run(&ToyFormatter, &mut store);
    assert!(report.is_success(), "failures: {:?}", failing_units(&report));
}
