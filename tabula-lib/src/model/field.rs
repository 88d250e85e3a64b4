//! Declared field types and ingestion-time coercion

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// Declared type of a field.
///
/// Only used to coerce raw values when records are ingested; records never
/// re-check their types afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Float,
    String,
    #[serde(alias = "bool")]
    Boolean,
    Object,
}

impl FieldType {
    /// Coerces a raw value into this type.
    ///
    /// - `Int` parses the leading integer of strings and truncates floats.
    /// - `Float` parses the leading number of strings.
    /// - `Boolean` is `true` for `true`, `1`, `"1"` and `"true"`.
    /// - `String` stringifies scalars and leaves null alone.
    /// - `Object` passes the value through.
    ///
    /// Values that cannot be parsed as a number become [`Value::Null`].
    pub fn coerce(self, raw: Value) -> Value {
        match self {
            FieldType::Int => match raw {
                Value::Int(_) => raw,
                Value::Float(f) if f.is_finite() => Value::Int(f.trunc() as i64),
                Value::String(s) => parse_int_prefix(&s).map(Value::Int).unwrap_or(Value::Null),
                _ => Value::Null,
            },
            FieldType::Float => match raw {
                Value::Float(_) => raw,
                Value::Int(i) => Value::Float(i as f64),
                Value::String(s) => parse_float_prefix(&s).map(Value::Float).unwrap_or(Value::Null),
                _ => Value::Null,
            },
            FieldType::Boolean => Value::Bool(raw.is_truthy()),
            FieldType::String => match raw {
                Value::Null | Value::String(_) => raw,
                other => Value::String(other.to_string()),
            },
            FieldType::Object => raw,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
        })
    }
}

/// Parses the longest integer prefix (`"42px"` → 42).
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse().ok()
}

/// Parses the longest float prefix (`"3.5kg"` → 3.5).
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    (1..=end).rev().find_map(|len| s[..len].parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_parses_leading_digits() {
        assert_eq!(FieldType::Int.coerce(Value::from("42px")), Value::Int(42));
        assert_eq!(FieldType::Int.coerce(Value::from(" -7")), Value::Int(-7));
        assert_eq!(FieldType::Int.coerce(Value::from(3.9)), Value::Int(3));
        assert_eq!(FieldType::Int.coerce(Value::from("abc")), Value::Null);
    }

    #[test]
    fn float_parses_leading_number() {
        assert_eq!(FieldType::Float.coerce(Value::from("3.5kg")), Value::Float(3.5));
        assert_eq!(FieldType::Float.coerce(Value::from(2i64)), Value::Float(2.0));
        assert_eq!(FieldType::Float.coerce(Value::from("e")), Value::Null);
    }

    #[test]
    fn boolean_truthiness() {
        assert_eq!(FieldType::Boolean.coerce(Value::from("true")), Value::Bool(true));
        assert_eq!(FieldType::Boolean.coerce(Value::from("1")), Value::Bool(true));
        assert_eq!(FieldType::Boolean.coerce(Value::from(1i64)), Value::Bool(true));
        assert_eq!(FieldType::Boolean.coerce(Value::from("yes")), Value::Bool(false));
        assert_eq!(FieldType::Boolean.coerce(Value::Null), Value::Bool(false));
    }

    #[test]
    fn string_stringifies() {
        assert_eq!(FieldType::String.coerce(Value::from(30i64)), Value::from("30"));
        assert_eq!(FieldType::String.coerce(Value::Null), Value::Null);
    }
}
