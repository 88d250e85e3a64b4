//! Filters and operator evaluation

use serde::Deserialize;
use serde::Serialize;

use super::Record;
use super::Value;
use super::keycode::keycode;

/// Filter operator.
///
/// Parsed from its symbolic form (`"="`, `">="`, `"like"`, ...). Anything
/// unrecognized becomes [`Operator::Unknown`], which never passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
    In,
    InSet,
    Like,
    LikeCode,
    Unknown(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Ge => ">=",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Lt => "<",
            Operator::In => "in",
            Operator::InSet => "inset",
            Operator::Like => "like",
            Operator::LikeCode => "likecode",
            Operator::Unknown(s) => s,
        }
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        match s {
            "=" => Operator::Eq,
            "!=" => Operator::Ne,
            ">=" => Operator::Ge,
            ">" => Operator::Gt,
            "<=" => Operator::Le,
            "<" => Operator::Lt,
            "in" => Operator::In,
            "inset" => Operator::InSet,
            "like" => Operator::Like,
            "likecode" => Operator::LikeCode,
            other => Operator::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::from(s.as_str())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

/// How multiple filters combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// A filter on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: impl Into<Operator>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Evaluates this filter against a record's value for the field.
    pub fn passes(&self, record: &Record) -> bool {
        let actual = record.value(&self.field);
        let expected = &self.value;
        match &self.operator {
            Operator::Eq => actual.loose_eq(expected),
            Operator::Ne => !actual.loose_eq(expected),
            Operator::Ge => actual.partial_compare(expected).is_some_and(|o| o.is_ge()),
            Operator::Gt => actual.partial_compare(expected).is_some_and(|o| o.is_gt()),
            Operator::Le => actual.partial_compare(expected).is_some_and(|o| o.is_le()),
            Operator::Lt => actual.partial_compare(expected).is_some_and(|o| o.is_lt()),
            Operator::In => expected.members().iter().any(|m| actual.loose_eq(m)),
            Operator::InSet => {
                let set = actual.members();
                expected
                    .members()
                    .iter()
                    .any(|wanted| set.iter().any(|have| have.loose_eq(wanted)))
            }
            Operator::Like => actual
                .to_string()
                .to_lowercase()
                .contains(&expected.to_string().to_lowercase()),
            Operator::LikeCode => keycode(&actual.to_string()).contains(&keycode(&expected.to_string())),
            Operator::Unknown(_) => false,
        }
    }
}

/// Ordered set of per-field filters.
///
/// Setting a filter on a field that already has one replaces it in place,
/// keeping evaluation order stable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(Vec<Filter>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the filter for `filter.field`.
    pub fn set(&mut self, filter: Filter) {
        match self.0.iter_mut().find(|f| f.field == filter.field) {
            Some(existing) => *existing = filter,
            None => self.0.push(filter),
        }
    }

    /// Builder form of [`Filters::set`].
    pub fn with(mut self, filter: Filter) -> Self {
        self.set(filter);
        self
    }

    /// Removes the filter on `field`, returning it.
    pub fn remove(&mut self, field: &str) -> Option<Filter> {
        let index = self.0.iter().position(|f| f.field == field)?;
        Some(self.0.remove(index))
    }

    pub fn get(&self, field: &str) -> Option<&Filter> {
        self.0.iter().find(|f| f.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.0.iter()
    }

    /// Evaluates the filters against one record.
    ///
    /// Evaluation walks the filters in order and stops early: in `And` mode
    /// at the first failing filter, in `Or` mode at the first passing one.
    /// The record is accepted when the last evaluated filter passed. An
    /// empty filter set accepts everything.
    pub fn accepts(&self, record: &Record, mode: FilterMode) -> bool {
        let mut passed = true;
        for filter in &self.0 {
            passed = filter.passes(record);
            match mode {
                FilterMode::And if !passed => break,
                FilterMode::Or if passed => break,
                _ => {}
            }
        }
        passed
    }
}

impl FromIterator<Filter> for Filters {
    fn from_iter<T: IntoIterator<Item = Filter>>(iter: T) -> Self {
        let mut filters = Filters::new();
        for filter in iter {
            filters.set(filter);
        }
        filters
    }
}
