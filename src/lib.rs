//! `fmtconform` drives conformance suites for source formatters that ship
//! several parsers and run under several interpreter versions.
//!
//! Fixtures are formatted once per interpreter with a primary parser, the
//! results are snapshotted, and every alternate parser must agree with the
//! primary byte for byte.

/// Suite registration, execution and the formatter seam.
pub mod conformance;
