//! Harness configuration and the context passed to every suite.

use std::env;

use super::interpreter::ResolvedInterpreters;

/// Environment variable enabling structural round-trip checks.
pub const AST_COMPARE_ENV: &str = "AST_COMPARE";

/// Process-level harness switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Register a structural round-trip unit per fixture and interpreter.
    pub ast_compare: bool,
}

impl HarnessConfig {
    /// Reads switches from the environment.
    ///
    /// [`AST_COMPARE_ENV`] is on when set to anything other than an empty
    /// string, `0`, `false`, `no` or `off` (case-insensitive).
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            ast_compare: env::var(AST_COMPARE_ENV).is_ok_and(|value| is_truthy(&value)),
        }
    }

    /// Returns a copy with structural comparison switched on or off.
    #[must_use]
    pub const fn with_ast_compare(mut self, enabled: bool) -> Self {
        self.ast_compare = enabled;
        self
    }
}

fn is_truthy(value: &str) -> bool {
    let trimmed = value.trim();
    !(trimmed.is_empty()
        || ["0", "false", "no", "off"]
            .iter()
            .any(|falsy| trimmed.eq_ignore_ascii_case(falsy)))
}

/// Everything a suite needs from the process: resolved interpreters and the
/// harness switches. Built once and passed explicitly.
#[derive(Debug, Clone, Copy)]
pub struct HarnessContext<'a> {
    /// Interpreters resolved for this process.
    pub interpreters: &'a ResolvedInterpreters,
    /// Harness switches.
    pub config: HarnessConfig,
}

impl<'a> HarnessContext<'a> {
    /// Creates a context from explicit parts.
    #[must_use]
    pub const fn new(interpreters: &'a ResolvedInterpreters, config: HarnessConfig) -> Self {
        Self {
            interpreters,
            config,
        }
    }
}

impl HarnessContext<'static> {
    /// The host's memoized interpreters and the environment's switches.
    #[must_use]
    pub fn host() -> Self {
        Self::new(ResolvedInterpreters::host(), HarnessConfig::from_env())
    }
}
