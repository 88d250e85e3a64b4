//! Row selection.

use std::sync::Arc;

use serde::Deserialize;
use tabula_lib::model::Record;

/// Selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// No selection allowed.
    #[default]
    None,
    /// One row at a time.
    Single,
    /// Every click toggles the clicked row.
    Simple,
    /// Click replaces, ctrl-click adds.
    Multi,
    /// Like `Multi`, driven by a checkbox per row.
    Checkbox,
}

/// Selected records, in selection order.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub mode: SelectionMode,
    records: Vec<Arc<Record>>,
}

impl Selection {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record with the same identity is selected.
    pub fn contains(&self, record: &Record) -> bool {
        self.records.iter().any(|r| r.hash() == record.hash())
    }

    /// Applies a select action for `record`.
    ///
    /// - `None`: nothing happens.
    /// - `Simple`: toggles the record.
    /// - `Single`, or `keep == false`: the selection is replaced.
    /// - Otherwise the record is added; an already selected record stays.
    pub fn select(&mut self, record: Arc<Record>, keep: bool) {
        match self.mode {
            SelectionMode::None => {}
            SelectionMode::Simple => {
                if !self.remove(&record) {
                    self.records.push(record);
                }
            }
            SelectionMode::Single => {
                self.records.clear();
                self.records.push(record);
            }
            SelectionMode::Multi | SelectionMode::Checkbox if !keep => {
                self.records.clear();
                self.records.push(record);
            }
            SelectionMode::Multi | SelectionMode::Checkbox => {
                if !self.contains(&record) {
                    self.records.push(record);
                }
            }
        }
    }

    /// Removes `record`; returns `true` if it was selected.
    pub fn remove(&mut self, record: &Record) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.hash() != record.hash());
        self.records.len() != before
    }

    /// Replaces the whole selection.
    pub fn set(&mut self, records: Vec<Arc<Record>>) {
        self.records = match self.mode {
            SelectionMode::None => Vec::new(),
            SelectionMode::Single => records.into_iter().take(1).collect(),
            _ => records,
        };
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Re-matches the selection against freshly loaded records by primary
    /// key. Records no longer present are dropped; order is kept.
    pub fn restore(&mut self, loaded: &[Arc<Record>]) {
        self.records = self
            .records
            .iter()
            .filter_map(|old| loaded.iter().find(|new| new.is_equal(old)).cloned())
            .collect();
    }
}

/// Positional comparison by reference: same length and the same record
/// allocation at every index.
pub fn same_selection(a: &[Arc<Record>], b: &[Arc<Record>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
}
