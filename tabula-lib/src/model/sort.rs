//! Sorters

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

use super::Record;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl Direction {
    /// The opposite direction.
    pub fn toggle(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorter {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl Sorter {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Desc)
    }
}

/// Compares two records across sorters in priority order.
///
/// The first sorter whose field differs decides.
pub fn compare_records(a: &Record, b: &Record, sorters: &[Sorter]) -> Ordering {
    for sorter in sorters {
        let ord = a.value(&sorter.field).sort_cmp(b.value(&sorter.field));
        let ord = match sorter.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
