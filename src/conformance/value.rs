//! Formatter passthrough option values.
//!
//! Options the harness does not understand itself are forwarded to the
//! formatter untouched. `OptionValue` carries them with their YAML shape,
//! rejecting null and preserving map insertion order via `IndexMap`.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::{self, MapAccess, SeqAccess, Visitor};

/// A formatter option value supplied by a caller or definition file.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// A boolean scalar (`true` / `false`).
    Bool(bool),
    /// A signed 64-bit integer scalar.
    Integer(i64),
    /// A floating-point scalar.
    Float(f64),
    /// A string scalar.
    String(String),
    /// An ordered sequence of values.
    Sequence(Vec<Self>),
    /// An ordered mapping of string keys to values.
    Mapping(IndexMap<String, Self>),
}

impl fmt::Display for OptionValue {
    /// Renders the value as a formatter command-line argument.
    ///
    /// Sequences are comma-joined; mappings render as `key=value` pairs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Mapping(entries) => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<'de> Deserialize<'de> for OptionValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(OptionValueVisitor)
    }
}

/// Visitor implementation for deserializing arbitrary YAML values into
/// `OptionValue`, rejecting null.
struct OptionValueVisitor;

impl<'de> Visitor<'de> for OptionValueVisitor {
    type Value = OptionValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(
            "a non-null option value (bool, integer, float, string, \
             sequence, or mapping)",
        )
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(OptionValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(OptionValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(OptionValue::Integer)
            .map_err(|_| de::Error::custom(format!("integer {v} is out of range for i64")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(OptionValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(OptionValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(OptionValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Err(de::Error::custom("null is not a valid formatter option value"))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Err(de::Error::custom("null is not a valid formatter option value"))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(OptionValue::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, val)) = map.next_entry()? {
            entries.insert(key, val);
        }
        Ok(OptionValue::Mapping(entries))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::bool(OptionValue::Bool(true), "true")]
    #[case::int(OptionValue::Integer(4), "4")]
    #[case::string(OptionValue::from("es5"), "es5")]
    #[case::sequence(
        OptionValue::Sequence(vec![OptionValue::from("a"), OptionValue::Integer(2)]),
        "a,2"
    )]
    fn values_render_as_arguments(#[case] value: OptionValue, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[rstest]
    fn yaml_values_keep_their_shape() {
        let parsed: IndexMap<String, OptionValue> =
            serde_saphyr::from_str("tab_width: 4\nquotes: single\nflags: [a, b]\n")
                .expect("should parse");
        assert_eq!(parsed.get("tab_width"), Some(&OptionValue::Integer(4)));
        assert_eq!(parsed.get("quotes"), Some(&OptionValue::from("single")));
        assert_eq!(
            parsed.get("flags"),
            Some(&OptionValue::Sequence(vec![
                OptionValue::from("a"),
                OptionValue::from("b")
            ]))
        );
    }

    #[rstest]
    fn null_is_rejected() {
        let result: Result<IndexMap<String, OptionValue>, _> =
            serde_saphyr::from_str("tab_width: ~\n");
        assert!(result.is_err());
    }
}
