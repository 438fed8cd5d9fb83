//! Shared helpers for integration tests: a toy formatter and interpreter
//! fixtures.

use fmtconform::conformance::{
    AstNode, FormatError, Formatter, InterpreterBinding, ParseResult, ParserName,
    ResolvedInterpreters, ResolvedOptions, ResolvedTrack,
};
use indexmap::IndexMap;
use semver::Version;

/// Formats `name=value` lines as `name = value`.
///
/// Parsers `toy` and `toy-alt` are equivalent; `drifting` upper-cases names,
/// `lossy` drops the last line and `panicky` panics. Lines without `=` are
/// recoverable parse errors, and any `!!` makes both formatting and parsing
/// fail outright.
pub struct ToyFormatter;

impl ToyFormatter {
    fn format_line(parser: &str, line: &str) -> String {
        match line.split_once('=') {
            Some((name, value)) if parser == "drifting" => {
                format!("{} = {}", name.trim().to_uppercase(), value.trim())
            }
            Some((name, value)) => format!("{} = {}", name.trim(), value.trim()),
            None => line.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

impl Formatter for ToyFormatter {
    fn format(&self, source: &str, options: &ResolvedOptions) -> Result<String, FormatError> {
        let parser = options.parser.as_str();
        if parser == "panicky" {
            panic!("toy parser crashed");
        }
        if source.contains("!!") {
            return Err(FormatError::rejected("unterminated bang"));
        }
        let mut lines: Vec<String> = source
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| Self::format_line(parser, line))
            .collect();
        if parser == "lossy" {
            lines.pop();
        }
        Ok(lines.iter().map(|line| format!("{line}\n")).collect())
    }

    fn parse(&self, source: &str, _options: &ResolvedOptions) -> Result<ParseResult, FormatError> {
        if source.contains("!!") {
            return Err(FormatError::rejected("unterminated bang"));
        }
        let mut errors = Vec::new();
        let mut nodes = Vec::new();
        for (index, line) in source.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let loc = AstNode::Integer(i64::try_from(index).unwrap_or(i64::MAX));
            let node = if let Some((name, value)) = line.split_once('=') {
                AstNode::mapping([
                    ("type", AstNode::string("Assign")),
                    ("name", AstNode::string(name.trim())),
                    ("value", AstNode::string(value.trim())),
                    ("spacing", AstNode::string(line.replace(|c: char| !c.is_whitespace(), ""))),
                    ("source", AstNode::string(line)),
                    ("loc", loc),
                ])
            } else {
                errors.push(format!("line {index}: expected '='"));
                AstNode::mapping([
                    ("type", AstNode::string("Bogus")),
                    ("source", AstNode::string(line)),
                    ("loc", loc),
                ])
            };
            nodes.push(node);
        }
        Ok(ParseResult {
            ast: AstNode::Sequence(nodes),
            errors,
        })
    }

    fn clean(
        &self,
        kind: Option<&str>,
        fields: &mut IndexMap<String, AstNode>,
        _options: &ResolvedOptions,
    ) {
        if kind == Some("Assign") {
            fields.shift_remove("spacing");
        }
    }
}

/// A valid parser name.
pub fn parser(name: &str) -> ParserName {
    ParserName::new(name).expect("valid parser name")
}

/// Parsers for a list of names.
pub fn parsers(names: &[&str]) -> Vec<ParserName> {
    names.iter().map(|name| parser(name)).collect()
}

/// A binding for `executable` at `major.minor.0`.
pub fn binding(executable: &str, major: u64, minor: u64) -> InterpreterBinding {
    InterpreterBinding {
        executable: executable.to_owned(),
        version: Version::new(major, minor, 0),
    }
}

/// Resolution results for the two default tracks.
pub fn interpreters(
    python2: Option<InterpreterBinding>,
    python3: Option<InterpreterBinding>,
) -> ResolvedInterpreters {
    ResolvedInterpreters::from_tracks(vec![
        ResolvedTrack {
            track: "python2".to_owned(),
            binding: python2,
        },
        ResolvedTrack {
            track: "python3".to_owned(),
            binding: python3,
        },
    ])
}

/// Both tracks installed.
pub fn both_tracks() -> ResolvedInterpreters {
    interpreters(Some(binding("python2", 2, 7)), Some(binding("python3", 3, 11)))
}

/// Only the newer track installed.
pub fn python3_only() -> ResolvedInterpreters {
    interpreters(None, Some(binding("python3", 3, 11)))
}
