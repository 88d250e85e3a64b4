//! Record store: loading, sort/filter orchestration and events.

mod array;
mod config;
mod events;
mod proxy;
mod remote;

pub use array::ArrayProxy;
pub use config::*;
pub use events::*;
pub use proxy::*;
pub use remote::RemoteProxy;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;
use serde_json::Map;
use serde_json::Value as Json;

use crate::busy::BusyFlag;
use crate::model::Data;
use crate::model::FieldType;
use crate::model::Filter;
use crate::model::FilterMode;
use crate::model::Filters;
use crate::model::RawRecord;
use crate::model::Record;
use crate::model::Sorter;
use crate::transport::HttpClient;

#[derive(Debug)]
struct StoreState {
    status: LoadStatus,
    data: Option<Data>,
    primary_keys: Vec<String>,
    field_types: HashMap<String, FieldType>,
    sorters: Vec<Sorter>,
    remote_sort: bool,
    filters: Filters,
    filter_mode: FilterMode,
    remote_filter: bool,
    page: Option<u32>,
    limit: Option<u32>,
    params: Map<String, Json>,
    total: Option<u64>,
    message: Option<String>,
}

impl StoreState {
    fn from_config(config: StoreConfig) -> Self {
        Self {
            status: LoadStatus::Unloaded,
            data: None,
            primary_keys: config.primary_keys,
            field_types: config.field_types,
            sorters: config.sorters,
            remote_sort: config.remote_sort,
            filters: config.filters,
            filter_mode: config.filter_mode,
            remote_filter: config.remote_filter,
            page: config.page,
            limit: config.limit,
            params: config.params,
            total: None,
            message: None,
        }
    }

    fn read_request(&self) -> ReadRequest {
        ReadRequest {
            page: self.page,
            limit: self.limit,
            params: self.params.clone(),
            sorters: self.remote_sort.then(|| self.sorters.clone()),
            filters: self
                .remote_filter
                .then(|| (self.filters.clone(), self.filter_mode)),
        }
    }

    /// What `on_update` has to do next to bring `data` in line.
    fn next_step(&self) -> Option<UpdateStep> {
        let data = self.data.clone()?;

        if data.sorters() != self.sorters {
            return Some(if self.remote_sort {
                UpdateStep::Reload
            } else {
                UpdateStep::Sort(data, self.sorters.clone())
            });
        }

        let (filters, mode) = data.filters();
        if filters != self.filters || (!self.filters.is_empty() && mode != self.filter_mode) {
            return Some(if self.remote_filter {
                UpdateStep::Reload
            } else {
                UpdateStep::Filter(data, self.filters.clone(), self.filter_mode)
            });
        }

        Some(UpdateStep::Converged)
    }
}

enum UpdateStep {
    Reload,
    Sort(Data, Vec<Sorter>),
    Filter(Data, Filters, FilterMode),
    Converged,
}

struct StoreInner {
    proxy: Box<dyn Proxy>,
    state: RwLock<StoreState>,
    loading: BusyFlag,
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicUsize,
}

/// A loadable, sortable, filterable record set.
///
/// The store owns at most one [`Data`], swapped in whole when a load
/// completes. Sort and filter requests are kept as pending state; after a
/// load or a change, [`Store::on_update`] converges the data to them, either
/// locally or by reloading when sort/filter is remote.
///
/// A `load()` issued while another is in flight is dropped, not queued.
///
/// `Store` is a cheap handle; clones share state.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tabula_lib::Store;
/// use tabula_lib::store::{ArrayConfig, StoreConfig};
///
/// let store = Store::array(
///     StoreConfig::default(),
///     ArrayConfig::new(["name", "age"], vec![json!(["Bob", 30]), json!(["Ann", 25])]),
/// );
/// assert!(!store.is_loaded());
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.inner.state)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Creates a store over any proxy.
    ///
    /// With `auto_load` set and a tokio runtime available, loading starts
    /// immediately on a spawned task.
    pub fn new(config: StoreConfig, proxy: impl Proxy + 'static) -> Self {
        let auto_load = config.auto_load;
        let store = Self {
            inner: Arc::new(StoreInner {
                proxy: Box::new(proxy),
                state: RwLock::new(StoreState::from_config(config)),
                loading: BusyFlag::new(),
                listeners: RwLock::new(Vec::new()),
                next_listener: AtomicUsize::new(0),
            }),
        };

        if auto_load {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let store = store.clone();
                    handle.spawn(async move {
                        store.load().await;
                    });
                }
                Err(_) => log::warn!("auto_load requested outside a tokio runtime; call load()"),
            }
        }

        store
    }

    /// Creates a store over inline records.
    pub fn array(config: StoreConfig, data: ArrayConfig) -> Self {
        Self::new(config, ArrayProxy::new(data))
    }

    /// Creates a store over a JSON endpoint.
    pub fn remote(config: StoreConfig, remote: RemoteConfig, client: HttpClient) -> Self {
        Self::new(config, RemoteProxy::new(client, remote))
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Registers a listener.
    pub fn on(&self, listener: impl Fn(StoreEvent) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::SeqCst));
        let listener: Listener = Arc::new(listener);
        if let Ok(mut guard) = self.inner.listeners.write() {
            guard.push((id, listener));
        }
        id
    }

    /// Unregisters a listener.
    pub fn off(&self, id: ListenerId) {
        if let Ok(mut guard) = self.inner.listeners.write() {
            guard.retain(|(existing, _)| *existing != id);
        }
    }

    fn emit(&self, event: StoreEvent) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .map(|g| g.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();
        log::trace!("store event {:?} -> {} listeners", event, listeners.len());
        for listener in listeners {
            listener(event);
        }
    }

    // -------------------------------------------------------------------------
    // State access
    // -------------------------------------------------------------------------

    fn read<T: Default>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        self.inner.state.read().map(|g| f(&g)).unwrap_or_default()
    }

    fn write(&self, f: impl FnOnce(&mut StoreState)) {
        if let Ok(mut guard) = self.inner.state.write() {
            f(&mut guard);
        }
    }

    pub fn status(&self) -> LoadStatus {
        self.read(|s| s.status)
    }

    pub fn is_loaded(&self) -> bool {
        self.status() == LoadStatus::Loaded
    }

    pub fn is_loading(&self) -> bool {
        self.inner.loading.is_busy()
    }

    /// The installed record set, if any load has succeeded.
    pub fn data(&self) -> Option<Data> {
        self.read(|s| s.data.clone())
    }

    /// Current view of the records.
    pub fn records(&self) -> Vec<Arc<Record>> {
        self.data().map(|d| d.records()).unwrap_or_default()
    }

    pub fn record(&self, index: usize) -> Option<Arc<Record>> {
        self.data().and_then(|d| d.get(index))
    }

    pub fn len(&self) -> usize {
        self.data().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn primary_keys(&self) -> Vec<String> {
        self.read(|s| s.primary_keys.clone())
    }

    /// Total reported by the last successful load.
    pub fn total(&self) -> Option<u64> {
        self.read(|s| s.total)
    }

    /// Message of the last failed load.
    pub fn last_message(&self) -> Option<String> {
        self.read(|s| s.message.clone())
    }

    pub fn page(&self) -> Option<u32> {
        self.read(|s| s.page)
    }

    pub fn limit(&self) -> Option<u32> {
        self.read(|s| s.limit)
    }

    /// Sets the page sent on the next load. Does not reload.
    pub fn set_page(&self, page: Option<u32>) {
        self.write(|s| s.page = page);
    }

    /// Sets the page size sent on the next load. Does not reload.
    pub fn set_limit(&self, limit: Option<u32>) {
        self.write(|s| s.limit = limit);
    }

    /// Sets an extra proxy parameter. Does not reload.
    pub fn set_param(&self, key: impl Into<String>, value: impl Into<Json>) {
        let (key, value) = (key.into(), value.into());
        self.write(|s| {
            s.params.insert(key, value);
        });
    }

    /// Number of pages given the last total and the limit.
    pub fn page_count(&self) -> Option<u32> {
        let (total, limit) = self.read(|s| (s.total, s.limit));
        match (total, limit) {
            (Some(total), Some(limit)) if limit > 0 => Some(total.div_ceil(limit as u64).max(1) as u32),
            _ => None,
        }
    }

    pub fn sorters(&self) -> Vec<Sorter> {
        self.read(|s| s.sorters.clone())
    }

    pub fn filters(&self) -> Filters {
        self.read(|s| s.filters.clone())
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.read(|s| s.filter_mode)
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Loads the store.
    ///
    /// - Already loaded: fires `Load` with the existing data, returns `true`.
    /// - Already loading: dropped, returns `false`.
    /// - Proxy failure: the store goes back to `Unloaded` and keeps no data
    ///   from the failed response; returns `false`.
    ///
    /// On success the new [`Data`] replaces the old one, `Load` fires, and
    /// [`Store::on_update`] runs to converge sort and filter.
    pub async fn load(&self) -> bool {
        if self.is_loaded() {
            self.emit(StoreEvent::Load);
            return true;
        }

        let Some(busy) = self.inner.loading.try_acquire() else {
            log::debug!("load dropped: already loading");
            return false;
        };

        let mut request = None;
        self.write(|s| {
            s.status = LoadStatus::Loading;
            request = Some(s.read_request());
        });
        let Some(request) = request else {
            return false;
        };

        // The response reflects the request, not whatever is pending when
        // it arrives.
        let sent_sorters = request.sorters.clone();
        let sent_filters = request.filters.clone();

        self.emit(StoreEvent::BeforeLoad);
        log::debug!("loading page {:?} limit {:?}", request.page, request.limit);
        let result = self.inner.proxy.read(request).await;

        if !result.success {
            log::warn!(
                "load failed: {}",
                result.message.as_deref().unwrap_or("no message")
            );
            self.write(|s| {
                s.status = LoadStatus::Unloaded;
                s.message = result.message;
            });
            return false;
        }

        let count = result.records.len();
        self.write(|s| {
            let data = Data::new(
                result.records,
                s.field_types.clone(),
                s.primary_keys.clone(),
            );
            if let Some(sorters) = &sent_sorters {
                data.sort(sorters, false);
            }
            if let Some((filters, mode)) = &sent_filters {
                data.filter(Some(filters), *mode, false);
            }
            s.data = Some(data);
            s.total = result.total;
            s.message = result.message;
            s.status = LoadStatus::Loaded;
        });
        drop(busy);
        log::debug!("loaded {} records (total {:?})", count, self.total());

        self.emit(StoreEvent::Load);
        self.on_update().await;
        true
    }

    /// Marks the store unloaded and loads again.
    pub async fn reload(&self) -> bool {
        self.write(|s| {
            if s.status == LoadStatus::Loaded {
                s.status = LoadStatus::Unloaded;
            }
        });
        self.load().await
    }

    /// Converges the data to the pending sorters and filters, then fires
    /// `Update` once.
    ///
    /// Sort is reconciled before filter. With remote sort or filter a
    /// mismatch triggers a reload instead, and that reload's own update
    /// fires the event. If a local sort or filter is dropped because one is
    /// already running, convergence stops without firing.
    pub fn on_update(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            loop {
                let Some(step) = self.read(|s| s.next_step()) else {
                    return;
                };
                match step {
                    UpdateStep::Converged => break,
                    UpdateStep::Reload => {
                        log::debug!("remote sort/filter changed, reloading");
                        self.reload().await;
                        return;
                    }
                    UpdateStep::Sort(data, sorters) => {
                        if !data.sort(&sorters, true) {
                            return;
                        }
                    }
                    UpdateStep::Filter(data, filters, mode) => {
                        if !data.filter(Some(&filters), mode, true) {
                            return;
                        }
                    }
                }
                tokio::task::yield_now().await;
            }
            self.emit(StoreEvent::Update);
        })
    }

    // -------------------------------------------------------------------------
    // Sort / filter API
    // -------------------------------------------------------------------------

    /// Replaces the sorters and converges.
    pub async fn sort_by(&self, sorters: Vec<Sorter>) {
        self.write(|s| s.sorters = sorters);
        self.on_update().await;
    }

    /// Replaces all filters and converges.
    pub async fn filter_by(&self, filters: Filters, mode: FilterMode) {
        self.write(|s| {
            s.filters = filters;
            s.filter_mode = mode;
        });
        self.on_update().await;
    }

    /// Adds or replaces one filter and converges.
    pub async fn set_filter(&self, filter: Filter) {
        self.write(|s| s.filters.set(filter));
        self.on_update().await;
    }

    /// Removes the filter on `field` and converges.
    pub async fn clear_filter(&self, field: &str) {
        self.write(|s| {
            s.filters.remove(field);
        });
        self.on_update().await;
    }

    /// Appends records to the current view and fires `Update`.
    ///
    /// See [`Data::add`] for how these interact with filtering.
    pub fn add(&self, records: Vec<RawRecord>) {
        if let Some(data) = self.data() {
            data.add(records);
            self.emit(StoreEvent::Update);
        }
    }

    /// Index of the first record whose `fields` equal the matcher's.
    ///
    /// Without `fields`, the matcher's primary keys are used.
    pub fn match_index(&self, matcher: &Record, fields: Option<&[&str]>) -> Option<usize> {
        let keys = matcher.primary_keys();
        let fields = fields.unwrap_or(keys.as_slice());
        self.records()
            .iter()
            .position(|record| matcher.matches_on(record, fields))
    }
}
