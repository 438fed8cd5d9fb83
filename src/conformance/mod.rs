//! Conformance suites for formatters with several parsers.
//!
//! A suite formats every fixture in a directory under each selected
//! interpreter, records the output as a snapshot, checks that every
//! alternate parser reproduces the primary output, and optionally checks
//! that formatting preserves the parsed structure.
//!
//! Registration ([`run_spec`], [`run_definition`]) and execution
//! ([`Suite::run`]) are separate, so the unit list can be inspected before
//! anything is formatted.

mod ast;
mod config;
mod definition;
mod error;
mod fixtures;
mod formatter;
mod interpreter;
mod interpreter_set;
mod newtypes;
mod normalize;
mod options;
mod snapshot;
mod suite;
mod value;
mod verify;
mod version;

pub use ast::{AstNode, KIND_FIELD, ParseResult};
pub use config::{AST_COMPARE_ENV, HarnessConfig, HarnessContext};
pub use definition::{SuiteDefinition, load_definition, parse_definition, run_definition};
pub use error::{CaseFailure, FormatError, HarnessError, ProbeError};
pub use fixtures::{
    DEFINITION_FILE_NAME, Fixture, HIDDEN_PREFIX, SNAPSHOT_EXTENSION, enumerate_fixtures,
    normalize_line_endings,
};
pub use formatter::{CommandFormatter, Formatter, format_fixture};
pub use interpreter::{
    CommandProbe, InterpreterBinding, ResolvedInterpreters, ResolvedTrack, VERSION_PROBE_SCRIPT,
    VersionProbe, VersionTrack, resolve,
};
pub use interpreter_set::{
    ALL_TRACKS_CHECK, AT_LEAST_ONE_CHECK, InterpreterSet, SetCheck, TrackCoverage, build_set,
};
pub use newtypes::ParserName;
pub use normalize::{
    GENERIC_COSMETIC_FIELDS, SOURCE_SLICE_FIELD, massage_ast, normalize_tree, strip_source_slices,
};
pub use options::{
    DEFAULT_PLUGIN_ROOT, DERIVED_KEYS, FormatOptions, OptionOverrides, ResolvedOptions,
};
pub use snapshot::{
    InstaStore, MemoryStore, RawSnapshot, SEPARATOR_CHAR, SEPARATOR_WIDTH, SnapshotStore,
    compose_snapshot,
};
pub use suite::{Suite, SuiteReport, UnitOutcome, run_spec};
pub use value::OptionValue;
pub use verify::{RoundTrip, round_trip, verify_alternate_parser};
pub use version::{VersionRange, WILDCARD, parse_reported_version};
