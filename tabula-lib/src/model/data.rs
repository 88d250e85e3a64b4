//! In-memory record set

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use super::FieldType;
use super::Filters;
use super::FilterMode;
use super::Record;
use super::Sorter;
use super::Value;
use super::compare_records;
use crate::busy::BusyFlag;

/// Raw, uncoerced record fields as they arrive from a proxy.
pub type RawRecord = HashMap<String, Value>;

#[derive(Debug, Default)]
struct DataInner {
    /// Every record in load order. Never reordered or filtered.
    origin_records: Vec<Arc<Record>>,
    /// Current view.
    records: Vec<Arc<Record>>,
    field_types: HashMap<String, FieldType>,
    primary_keys: Arc<[String]>,
    /// Sorters the current view reflects.
    sorters: Vec<Sorter>,
    /// Sorters `origin_records` already reflect (e.g. sorted by the server).
    origin_sorters: Vec<Sorter>,
    /// Filters the current view reflects.
    filters: Filters,
    filter_mode: FilterMode,
}

/// A typed record set with sort and filter.
///
/// `Data` keeps the full set in load order (`origin_records`) and a current
/// view (`records`). Filtering always rebuilds the view from the origin, so
/// a previously applied sort is lost; the owning store notices the sorter
/// mismatch and sorts again.
///
/// Sort and filter are each guarded by a busy flag: a call arriving while
/// the same operation is running on another task returns `false` without
/// doing anything.
///
/// `Data` is a cheap handle; clones share the same record set.
#[derive(Debug, Clone, Default)]
pub struct Data {
    inner: Arc<RwLock<DataInner>>,
    sorting: BusyFlag,
    filtering: BusyFlag,
}

impl Data {
    /// Creates a record set, coercing every record's declared fields.
    pub fn new(
        raw: Vec<RawRecord>,
        field_types: HashMap<String, FieldType>,
        primary_keys: Vec<String>,
    ) -> Self {
        let primary_keys: Arc<[String]> = primary_keys.into();
        let records: Vec<Arc<Record>> = raw
            .into_iter()
            .map(|fields| Arc::new(Record::from_raw(fields, &field_types, Arc::clone(&primary_keys))))
            .collect();
        let inner = DataInner {
            origin_records: records.clone(),
            records,
            field_types,
            primary_keys,
            ..Default::default()
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
            sorting: BusyFlag::new(),
            filtering: BusyFlag::new(),
        }
    }

    /// Appends records to the current view.
    ///
    /// The records are coerced like on construction but only reach the
    /// view, not `origin_records`; a later `filter(None)` drops them.
    pub fn add(&self, raw: Vec<RawRecord>) {
        if let Ok(mut guard) = self.inner.write() {
            let primary_keys = Arc::clone(&guard.primary_keys);
            let added: Vec<Arc<Record>> = raw
                .into_iter()
                .map(|fields| {
                    Arc::new(Record::from_raw(fields, &guard.field_types, Arc::clone(&primary_keys)))
                })
                .collect();
            guard.records.extend(added);
        }
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    /// The current view.
    pub fn records(&self) -> Vec<Arc<Record>> {
        self.inner
            .read()
            .map(|g| g.records.clone())
            .unwrap_or_default()
    }

    /// Every record in load order.
    pub fn origin_records(&self) -> Vec<Arc<Record>> {
        self.inner
            .read()
            .map(|g| g.origin_records.clone())
            .unwrap_or_default()
    }

    /// Record at `index` in the current view.
    pub fn get(&self, index: usize) -> Option<Arc<Record>> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.records.get(index).cloned())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorters the current view reflects.
    pub fn sorters(&self) -> Vec<Sorter> {
        self.inner
            .read()
            .map(|g| g.sorters.clone())
            .unwrap_or_default()
    }

    /// Filters and mode the current view reflects.
    pub fn filters(&self) -> (Filters, FilterMode) {
        self.inner
            .read()
            .map(|g| (g.filters.clone(), g.filter_mode))
            .unwrap_or_default()
    }

    pub fn is_sorting(&self) -> bool {
        self.sorting.is_busy()
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering.is_busy()
    }

    // -------------------------------------------------------------------------
    // Sort / filter
    // -------------------------------------------------------------------------

    /// Sorts the current view.
    ///
    /// With `execute = false` the sorters are only recorded, declaring that
    /// the records already arrive in that order (remote sorting). Returns
    /// `false` if another sort is in progress.
    pub fn sort(&self, sorters: &[Sorter], execute: bool) -> bool {
        let Some(_busy) = self.sorting.try_acquire() else {
            log::trace!("sort dropped: already sorting");
            return false;
        };
        let Ok(mut guard) = self.inner.write() else {
            return false;
        };

        guard.sorters = sorters.to_vec();
        if !execute {
            guard.origin_sorters = sorters.to_vec();
            return true;
        }

        if !sorters.is_empty() {
            guard.records.sort_by(|a, b| compare_records(a, b, sorters));
        }
        log::trace!("sorted {} records by {:?}", guard.records.len(), sorters);
        true
    }

    /// Filters the view from `origin_records`.
    ///
    /// `None` (or an empty set) restores the full origin list. With
    /// `execute = false` the filters are only recorded (remote filtering).
    /// Returns `false` if another filter is in progress.
    pub fn filter(&self, filters: Option<&Filters>, mode: FilterMode, execute: bool) -> bool {
        let Some(_busy) = self.filtering.try_acquire() else {
            log::trace!("filter dropped: already filtering");
            return false;
        };
        let Ok(mut guard) = self.inner.write() else {
            return false;
        };

        let filters = filters.cloned().unwrap_or_default();
        guard.filter_mode = mode;
        if !execute {
            guard.filters = filters;
            return true;
        }

        let records: Vec<Arc<Record>> = if filters.is_empty() {
            guard.origin_records.clone()
        } else {
            guard
                .origin_records
                .iter()
                .filter(|record| filters.accepts(record, mode))
                .cloned()
                .collect()
        };

        log::trace!(
            "filtered {} of {} records",
            records.len(),
            guard.origin_records.len()
        );
        guard.records = records;
        guard.filters = filters;
        // The view is back in origin order.
        guard.sorters = guard.origin_sorters.clone();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Data {
        let raw = vec![
            RawRecord::from([("n".to_string(), Value::from(2i64))]),
            RawRecord::from([("n".to_string(), Value::from(1i64))]),
        ];
        Data::new(raw, HashMap::new(), vec![])
    }

    #[test]
    fn sort_while_sorting_is_dropped() {
        let data = data();
        let busy = data.sorting.try_acquire();
        assert!(!data.sort(&[Sorter::asc("n")], true));
        assert_eq!(data.records()[0].value("n"), &Value::Int(2));
        assert!(data.sorters().is_empty());
        drop(busy);
        assert!(data.sort(&[Sorter::asc("n")], true));
        assert_eq!(data.records()[0].value("n"), &Value::Int(1));
    }

    #[test]
    fn filter_while_filtering_is_dropped() {
        let data = data();
        let _busy = data.filtering.try_acquire();
        let filters = Filters::new().with(super::super::Filter::new("n", "=", 1i64));
        assert!(!data.filter(Some(&filters), FilterMode::And, true));
        assert_eq!(data.len(), 2);
    }
}
