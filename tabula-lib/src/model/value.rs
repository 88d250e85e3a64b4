//! Value enum for dynamic field values

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A dynamic value held by a record field.
///
/// # Type Mapping
///
/// | Field type | Rust Variant |
/// |------------|--------------|
/// | (missing / null) | `Null` |
/// | boolean | `Bool` |
/// | int | `Int` |
/// | float | `Float` |
/// | string | `String` |
/// | object, arrays | `Json` |
///
/// # Example
///
/// ```
/// use tabula_lib::model::Value;
///
/// let name = Value::from("Ann");
/// let age = Value::from(25i64);
/// assert!(age.partial_compare(&Value::from("24")).is_some_and(|o| o.is_gt()));
/// assert_eq!(name.to_string(), "Ann");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(String),
    /// Objects, arrays and anything else passed through untouched.
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Json(_) => "json",
        }
    }

    /// Converts a raw JSON value, keeping scalars typed.
    pub fn from_json(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            other => Value::Json(other),
        }
    }

    /// Converts back into a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Json(j) => j.clone(),
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value.
    ///
    /// Strings are parsed after trimming; booleans count as 0 and 1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Truthiness used by boolean coercion: `true`, `1` and `"true"`/`"1"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i == 1,
            Value::Float(f) => *f == 1.0,
            Value::String(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s == "1"
            }
            _ => false,
        }
    }

    /// Element view for set-like values: JSON arrays or comma separated strings.
    pub fn members(&self) -> Vec<Value> {
        match self {
            Value::Json(serde_json::Value::Array(items)) => {
                items.iter().cloned().map(Value::from_json).collect()
            }
            Value::String(s) if s.is_empty() => Vec::new(),
            Value::String(s) => s
                .split(',')
                .map(|part| Value::String(part.trim().to_string()))
                .collect(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        }
    }

    /// Ordering between two values, if they are comparable.
    ///
    /// Numbers compare numerically, also against numeric strings. Strings
    /// compare lexically. Null is not comparable to anything.
    pub fn partial_compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Json(_), _) | (_, Value::Json(_)) => {
                Some(self.to_string().cmp(&other.to_string()))
            }
            _ => {
                let a = self.as_f64()?;
                let b = other.as_f64()?;
                a.partial_cmp(&b)
            }
        }
    }

    /// Loose equality used by filter operators (`"30" == 30`).
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => self.partial_compare(other) == Some(Ordering::Equal),
        }
    }

    /// Total ordering used by sorting. Nulls sort first; values that are not
    /// mutually comparable fall back to their display text.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .partial_compare(other)
                .unwrap_or_else(|| self.to_string().cmp(&other.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Json(j) => write!(f, "{}", j),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::from_json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Json(serde_json::Value::Array(
            v.into_iter().map(|item| item.into().to_json()).collect(),
        ))
    }
}
