//! Syntax trees returned by a formatter's debug parse.
//!
//! Trees are untyped: a node is a mapping of field names to values, and
//! values are scalars, sequences or nested mappings. [`AstNode`] makes the
//! three cases explicit so tree walks dispatch on the variant rather than
//! probing shapes.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::{self, MapAccess, SeqAccess, Visitor};

/// Field naming a mapping node's kind.
pub const KIND_FIELD: &str = "type";

/// A value in a syntax tree.
///
/// Mapping equality ignores key order.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// An explicit null.
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// An integer scalar.
    Integer(i64),
    /// A floating-point scalar.
    Float(f64),
    /// A string scalar.
    String(String),
    /// An ordered sequence of nodes.
    Sequence(Vec<Self>),
    /// A node object: field name to value.
    Mapping(IndexMap<String, Self>),
}

impl AstNode {
    /// Builds a mapping node from `(field, value)` pairs.
    #[must_use]
    pub fn mapping<K: Into<String>>(fields: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Mapping(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a string scalar.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// The node's kind, read from its [`KIND_FIELD`], for mapping nodes that
    /// carry one.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Mapping(fields) => match fields.get(KIND_FIELD) {
                Some(Self::String(kind)) => Some(kind),
                _ => None,
            },
            _ => None,
        }
    }

    /// Rewrites every mapping in the tree, outermost first.
    ///
    /// `visit` sees each mapping before its children are walked, so fields it
    /// removes are never descended into. Sequences are walked element-wise and
    /// scalars are returned unchanged.
    #[must_use]
    pub fn transform<F>(self, visit: &mut F) -> Self
    where
        F: FnMut(&mut IndexMap<String, Self>),
    {
        match self {
            Self::Sequence(items) => {
                Self::Sequence(items.into_iter().map(|item| item.transform(visit)).collect())
            }
            Self::Mapping(mut fields) => {
                visit(&mut fields);
                Self::Mapping(
                    fields
                        .into_iter()
                        .map(|(key, value)| (key, value.transform(visit)))
                        .collect(),
                )
            }
            scalar => scalar,
        }
    }
}

impl<'de> Deserialize<'de> for AstNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(AstNodeVisitor)
    }
}

struct AstNodeVisitor;

impl<'de> Visitor<'de> for AstNodeVisitor {
    type Value = AstNode;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a syntax tree value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(AstNode::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(AstNode::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(AstNode::Integer)
            .map_err(|_| de::Error::custom(format!("integer {v} is out of range for i64")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(AstNode::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(AstNode::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(AstNode::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(AstNode::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(AstNode::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        AstNode::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(AstNode::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut fields = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, val)) = map.next_entry()? {
            fields.insert(key, val);
        }
        Ok(AstNode::Mapping(fields))
    }
}

/// A debug parse: the tree plus any recoverable errors.
///
/// A non-empty `errors` list means the parser recovered from invalid input.
/// Such trees are still returned but are not held to round-trip fidelity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParseResult {
    /// The syntax tree.
    pub ast: AstNode,
    /// Recoverable parse errors, empty for valid input.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ParseResult {
    /// A parse without errors.
    #[must_use]
    pub const fn clean(ast: AstNode) -> Self {
        Self {
            ast,
            errors: Vec::new(),
        }
    }

    /// Returns `true` if the parser reported any error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
