use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use tabula_lib::Store;
use tabula_lib::model::{
    FieldType, Filter, FilterMode, Filters, RawRecord, Record, Sorter, Value,
};
use tabula_lib::store::{
    ArrayConfig, LoadStatus, Proxy, ReadRequest, ReadResult, StoreConfig, StoreEvent,
};

// -----------------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------------

fn people_rows() -> Vec<serde_json::Value> {
    vec![
        json!(["Bob", "30"]),
        json!(["Ann", "25"]),
        json!(["Cid", "41"]),
    ]
}

fn people_store(config: StoreConfig) -> Store {
    Store::array(
        config.primary_keys(["name"]).field_type("age", FieldType::Int),
        ArrayConfig::new(["name", "age"], people_rows()),
    )
}

fn names(store: &Store) -> Vec<String> {
    store
        .records()
        .iter()
        .map(|r| r.value("name").to_string())
        .collect()
}

fn record_events(store: &Store) -> Arc<Mutex<Vec<StoreEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    store.on(move |event| sink.lock().unwrap().push(event));
    events
}

/// Proxy that counts reads, records requests and waits on a gate.
#[derive(Default)]
struct CountingProxy {
    reads: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<ReadRequest>>>,
    gate: Option<Arc<Notify>>,
    fail: bool,
}

#[async_trait]
impl Proxy for CountingProxy {
    async fn read(&self, request: ReadRequest) -> ReadResult {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return ReadResult::failure("backend down");
        }
        let rows: Vec<RawRecord> = vec![
            RawRecord::from([("id".to_string(), Value::Int(2)), ("name".to_string(), "Ann".into())]),
            RawRecord::from([("id".to_string(), Value::Int(1)), ("name".to_string(), "Bob".into())]),
        ];
        ReadResult::success(rows, Some(2))
    }
}

// -----------------------------------------------------------------------------
// Loading
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_load_and_local_sort() {
    let store = people_store(StoreConfig::default());
    assert!(store.load().await);
    assert_eq!(store.status(), LoadStatus::Loaded);
    assert_eq!(names(&store), vec!["Bob", "Ann", "Cid"]);

    store.sort_by(vec![Sorter::asc("age")]).await;
    assert_eq!(names(&store), vec!["Ann", "Bob", "Cid"]);
    assert_eq!(store.record(0).unwrap().get_i64("age").unwrap(), Some(25));
}

#[tokio::test]
async fn test_initial_sorters_apply_after_load() {
    let store = people_store(StoreConfig::default().sorter(Sorter::desc("age")));
    store.load().await;
    assert_eq!(names(&store), vec!["Cid", "Bob", "Ann"]);
}

#[tokio::test]
async fn test_local_filter() {
    let store = people_store(StoreConfig::default());
    store.load().await;
    store.set_filter(Filter::new("age", ">=", 28)).await;
    assert_eq!(names(&store), vec!["Bob", "Cid"]);

    store.clear_filter("age").await;
    assert_eq!(names(&store), vec!["Bob", "Ann", "Cid"]);
}

#[tokio::test]
async fn test_filter_keeps_sort() {
    let store = people_store(StoreConfig::default());
    store.load().await;
    store.sort_by(vec![Sorter::desc("age")]).await;
    store
        .filter_by(
            Filters::new().with(Filter::new("name", "!=", "Bob")),
            FilterMode::And,
        )
        .await;
    assert_eq!(names(&store), vec!["Cid", "Ann"]);
}

#[tokio::test]
async fn test_concurrent_loads_issue_one_read() {
    let gate = Arc::new(Notify::new());
    let proxy = CountingProxy {
        gate: Some(Arc::clone(&gate)),
        ..Default::default()
    };
    let reads = Arc::clone(&proxy.reads);
    let store = Store::new(StoreConfig::default(), proxy);

    let (first, second, ()) = tokio::join!(store.load(), store.load(), async {
        gate.notify_one();
    });

    assert!(first);
    assert!(!second);
    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_load_on_loaded_store_fires_load_without_reading() {
    let proxy = CountingProxy::default();
    let reads = Arc::clone(&proxy.reads);
    let store = Store::new(StoreConfig::default(), proxy);
    store.load().await;
    let events = record_events(&store);

    assert!(store.load().await);
    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(*events.lock().unwrap(), vec![StoreEvent::Load]);

    store.reload().await;
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_load_leaves_store_unloaded() {
    let proxy = CountingProxy {
        fail: true,
        ..Default::default()
    };
    let store = Store::new(StoreConfig::default(), proxy);
    let events = record_events(&store);

    assert!(!store.load().await);
    assert_eq!(store.status(), LoadStatus::Unloaded);
    assert!(store.data().is_none());
    assert_eq!(store.last_message().as_deref(), Some("backend down"));
    assert_eq!(*events.lock().unwrap(), vec![StoreEvent::BeforeLoad]);
}

#[tokio::test]
async fn test_events_fire_in_order_with_single_update() {
    let store = people_store(
        StoreConfig::default()
            .sorter(Sorter::asc("age"))
            .filter(Filter::new("age", "<", 40)),
    );
    let events = record_events(&store);
    store.load().await;

    assert_eq!(
        *events.lock().unwrap(),
        vec![StoreEvent::BeforeLoad, StoreEvent::Load, StoreEvent::Update]
    );
    assert_eq!(names(&store), vec!["Ann", "Bob"]);
}

// -----------------------------------------------------------------------------
// Remote sort / paging
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_remote_sort_reloads_with_sorters() {
    let proxy = CountingProxy::default();
    let reads = Arc::clone(&proxy.reads);
    let requests = Arc::clone(&proxy.requests);
    let store = Store::new(StoreConfig::default().remote_sort(true), proxy);
    let events = record_events(&store);

    store.load().await;
    assert_eq!(reads.load(Ordering::SeqCst), 1);

    store.sort_by(vec![Sorter::desc("name")]).await;
    assert_eq!(reads.load(Ordering::SeqCst), 2);
    assert_eq!(
        requests.lock().unwrap()[1].sorters,
        Some(vec![Sorter::desc("name")])
    );
    // Order comes from the proxy, untouched.
    assert_eq!(names(&store), vec!["Ann", "Bob"]);

    let updates = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| **e == StoreEvent::Update)
        .count();
    assert_eq!(updates, 2);
}

/// Yields until the proxy has seen `count` reads.
async fn wait_for_reads(reads: &AtomicUsize, count: usize) {
    while reads.load(Ordering::SeqCst) < count {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_remote_sort_change_during_load_reloads() {
    let gate = Arc::new(Notify::new());
    let proxy = CountingProxy {
        gate: Some(Arc::clone(&gate)),
        ..Default::default()
    };
    let reads = Arc::clone(&proxy.reads);
    let requests = Arc::clone(&proxy.requests);
    let store = Store::new(StoreConfig::default().remote_sort(true), proxy);

    let (loaded, ()) = tokio::join!(store.load(), async {
        wait_for_reads(&reads, 1).await;
        store.sort_by(vec![Sorter::asc("name")]).await;
        gate.notify_one();
        wait_for_reads(&reads, 2).await;
        gate.notify_one();
    });

    assert!(loaded);
    assert_eq!(reads.load(Ordering::SeqCst), 2);
    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].sorters, Some(Vec::new()));
    assert_eq!(requests[1].sorters, Some(vec![Sorter::asc("name")]));
    assert_eq!(store.data().unwrap().sorters(), vec![Sorter::asc("name")]);
}

#[tokio::test]
async fn test_remote_filter_change_during_load_reloads() {
    let gate = Arc::new(Notify::new());
    let proxy = CountingProxy {
        gate: Some(Arc::clone(&gate)),
        ..Default::default()
    };
    let reads = Arc::clone(&proxy.reads);
    let requests = Arc::clone(&proxy.requests);
    let store = Store::new(StoreConfig::default().remote_filter(true), proxy);

    let (loaded, ()) = tokio::join!(store.load(), async {
        wait_for_reads(&reads, 1).await;
        store.set_filter(Filter::new("name", "=", "Bob")).await;
        gate.notify_one();
        wait_for_reads(&reads, 2).await;
        gate.notify_one();
    });

    assert!(loaded);
    assert_eq!(reads.load(Ordering::SeqCst), 2);
    let requests = requests.lock().unwrap();
    let (first, _) = requests[0].filters.clone().unwrap();
    assert!(first.is_empty());
    let (second, mode) = requests[1].filters.clone().unwrap();
    assert_eq!(second, store.filters());
    assert_eq!(mode, FilterMode::And);
}

#[tokio::test]
async fn test_remote_sort_with_local_filter_converges() {
    let proxy = CountingProxy::default();
    let reads = Arc::clone(&proxy.reads);
    let store = Store::new(
        StoreConfig::default()
            .remote_sort(true)
            .sorter(Sorter::asc("name")),
        proxy,
    );
    store.load().await;
    store.set_filter(Filter::new("name", "=", "Bob")).await;

    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(names(&store), vec!["Bob"]);
}

#[tokio::test]
async fn test_array_paging() {
    let store = people_store(StoreConfig::default().limit(2).page(2));
    store.load().await;
    assert_eq!(names(&store), vec!["Cid"]);
    assert_eq!(store.total(), Some(3));
    assert_eq!(store.page_count(), Some(2));

    store.set_page(Some(1));
    store.reload().await;
    assert_eq!(names(&store), vec!["Bob", "Ann"]);
}

#[tokio::test]
async fn test_positional_row_with_too_many_values_fails() {
    let store = Store::array(
        StoreConfig::default(),
        ArrayConfig::new(["name"], vec![json!(["Bob", 30])]),
    );
    assert!(!store.load().await);
    assert!(store.last_message().is_some());
}

// -----------------------------------------------------------------------------
// Lookup
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_match_index() {
    let store = people_store(StoreConfig::default());
    store.load().await;

    let matcher = Record::new(["name"]).set("name", "Cid");
    assert_eq!(store.match_index(&matcher, None), Some(2));

    let matcher = Record::new(["name"]).set("age", 25);
    assert_eq!(store.match_index(&matcher, Some(&["age"][..])), Some(1));

    let matcher = Record::new(["name"]).set("name", "Zed");
    assert_eq!(store.match_index(&matcher, None), None);
}

#[tokio::test]
async fn test_off_stops_delivery() {
    let store = people_store(StoreConfig::default());
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let id = store.on(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    store.off(id);
    store.load().await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}
