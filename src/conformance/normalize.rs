//! Structural normalization of syntax trees.
//!
//! Two trees are compared after removing fields that legitimately change
//! when code is re-printed: node positions, whatever the formatter declares
//! cosmetic for a node kind, and the raw source slice carried by tokens.

use indexmap::IndexMap;

use super::ast::AstNode;
use super::formatter::Formatter;
use super::options::ResolvedOptions;

/// Positional fields removed from every node before the formatter's own
/// cleaning hook runs.
pub const GENERIC_COSMETIC_FIELDS: &[&str] = &[
    "loc",
    "range",
    "start",
    "end",
    "lineno",
    "col_offset",
    "end_lineno",
    "end_col_offset",
];

/// The raw source slice attached to token nodes. Always removed.
pub const SOURCE_SLICE_FIELD: &str = "source";

/// Applies the generic cleaning contract: strips
/// [`GENERIC_COSMETIC_FIELDS`], then lets `clean` drop whatever else the
/// formatter considers cosmetic for a node of the given kind.
#[must_use]
pub fn massage_ast<C>(ast: AstNode, clean: &C) -> AstNode
where
    C: Fn(Option<&str>, &mut IndexMap<String, AstNode>),
{
    ast.transform(&mut |fields| {
        for field in GENERIC_COSMETIC_FIELDS {
            fields.shift_remove(*field);
        }
        let kind = match fields.get(super::ast::KIND_FIELD) {
            Some(AstNode::String(kind)) => Some(kind.clone()),
            _ => None,
        };
        clean(kind.as_deref(), fields);
    })
}

/// Removes [`SOURCE_SLICE_FIELD`] from every node at every depth.
#[must_use]
pub fn strip_source_slices(ast: AstNode) -> AstNode {
    ast.transform(&mut |fields| {
        fields.shift_remove(SOURCE_SLICE_FIELD);
    })
}

/// Normalizes a tree for structural comparison under `options`.
#[must_use]
pub fn normalize_tree(
    formatter: &dyn Formatter,
    ast: AstNode,
    options: &ResolvedOptions,
) -> AstNode {
    let massaged = massage_ast(ast, &|kind, fields| formatter.clean(kind, fields, options));
    strip_source_slices(massaged)
}
