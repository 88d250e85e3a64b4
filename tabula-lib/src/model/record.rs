//! Keyed record with primary-key identity

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use std::sync::OnceLock;

use sha2::Digest;
use sha2::Sha256;

use super::FieldType;
use super::Value;
use crate::error::FieldError;

/// A single row of a record set.
///
/// Records hold field values as a `HashMap<String, Value>` and are treated as
/// immutable once ingested. Identity is defined by the primary-key subset of
/// the fields only: two records with the same primary-key values are equal
/// and hash equal, whatever their other fields hold.
///
/// # Example
///
/// ```
/// use tabula_lib::model::Record;
///
/// let a = Record::new(["id"]).set("id", 7i64).set("name", "Ann");
/// let b = Record::new(["id"]).set("id", 7i64).set("name", "Annie");
/// assert!(a.is_equal(&b));
/// assert_eq!(a.hash(), b.hash());
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    /// The field values.
    pub(crate) fields: HashMap<String, Value>,

    /// Identity fields. Empty means "all fields".
    pub(crate) primary_keys: Arc<[String]>,

    /// Memoized identity hash.
    hash: OnceLock<String>,
}

impl Record {
    /// Creates an empty record with the given primary keys.
    pub fn new<I, S>(primary_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_keys(primary_keys.into_iter().map(Into::into).collect())
    }

    pub(crate) fn with_keys(primary_keys: Arc<[String]>) -> Self {
        Self {
            fields: HashMap::new(),
            primary_keys,
            hash: OnceLock::new(),
        }
    }

    /// Builds a record from raw values, coercing declared fields.
    ///
    /// Fields without a declared type pass through unchanged.
    pub fn from_raw(
        raw: impl IntoIterator<Item = (String, Value)>,
        field_types: &HashMap<String, FieldType>,
        primary_keys: Arc<[String]>,
    ) -> Self {
        let fields = raw
            .into_iter()
            .map(|(name, value)| {
                let value = match field_types.get(&name) {
                    Some(ty) => ty.coerce(value),
                    None => value,
                };
                (name, value)
            })
            .collect();
        Self {
            fields,
            primary_keys,
            hash: OnceLock::new(),
        }
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field value or `Null` when missing.
    pub fn value(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.fields.get(field).unwrap_or(&NULL)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Sets a field value (builder pattern).
    ///
    /// Only meant for constructing records; the identity hash is reset.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self.hash = OnceLock::new();
        self
    }

    /// The primary-key field names. Falls back to every field, sorted, when
    /// none were declared.
    pub fn primary_keys(&self) -> Vec<&str> {
        if self.primary_keys.is_empty() {
            let mut keys: Vec<&str> = self.fields.keys().map(String::as_str).collect();
            keys.sort_unstable();
            keys
        } else {
            self.primary_keys.iter().map(String::as_str).collect()
        }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Identity hash of the primary-key subset.
    ///
    /// Key order does not matter. The hash is computed once and memoized.
    pub fn hash(&self) -> &str {
        self.hash.get_or_init(|| {
            let mut keys = self.primary_keys();
            keys.sort_unstable();
            keys.dedup();

            let mut hasher = Sha256::new();
            for key in keys {
                hasher.update(key.as_bytes());
                hasher.update([0u8]);
                match self.fields.get(key) {
                    Some(value) => hasher.update(value.to_json().to_string().as_bytes()),
                    None => hasher.update([0xffu8]),
                }
                hasher.update([0u8]);
            }

            hasher.finalize().iter().fold(String::with_capacity(64), |mut out, b| {
                let _ = write!(out, "{:02x}", b);
                out
            })
        })
    }

    /// Compares the primary-key values of two records.
    ///
    /// Returns `false` if any of this record's keys is missing on `other`.
    pub fn is_equal(&self, other: &Record) -> bool {
        self.primary_keys().into_iter().all(|key| match other.fields.get(key) {
            Some(theirs) => self.fields.get(key) == Some(theirs),
            None => false,
        })
    }

    /// Checks the given fields for equality against `other`.
    pub fn matches_on(&self, other: &Record, fields: &[&str]) -> bool {
        fields
            .iter()
            .all(|field| match (self.fields.get(*field), other.fields.get(*field)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            })
    }

    /// Primary-key values as `key=value` pairs, e.g. `id=7,region=eu`.
    pub fn key_label(&self) -> String {
        self.primary_keys()
            .into_iter()
            .map(|key| format!("{}={}", key, self.value(key)))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn missing(&self, field: &str) -> FieldError {
        FieldError::Missing {
            record: self.key_label(),
            field: field.to_string(),
        }
    }

    fn wrong_type(&self, field: &str, expected: FieldType, found: &Value) -> FieldError {
        FieldError::WrongType {
            record: self.key_label(),
            field: field.to_string(),
            expected,
            found: found.type_name(),
        }
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if field is missing or wrong type.
    // Return Ok(None) only if the field exists and is Value::Null.
    // =========================================================================

    /// Gets a string field value.
    pub fn get_str(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None => Err(self.missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.wrong_type(field, FieldType::String, other)),
        }
    }

    /// Gets an integer field value.
    pub fn get_i64(&self, field: &str) -> Result<Option<i64>, FieldError> {
        match self.fields.get(field) {
            None => Err(self.missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(self.wrong_type(field, FieldType::Int, other)),
        }
    }

    /// Gets a float field value. Integers widen.
    pub fn get_f64(&self, field: &str) -> Result<Option<f64>, FieldError> {
        match self.fields.get(field) {
            None => Err(self.missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Float(n)) => Ok(Some(*n)),
            Some(Value::Int(n)) => Ok(Some(*n as f64)),
            Some(other) => Err(self.wrong_type(field, FieldType::Float, other)),
        }
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        match self.fields.get(field) {
            None => Err(self.missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.wrong_type(field, FieldType::Boolean, other)),
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}
