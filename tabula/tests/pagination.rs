use serde_json::json;

use tabula::component::Component;
use tabula::pagination::{Pagination, ToolItem};
use tabula::tabula_lib::Store;
use tabula::tabula_lib::store::{ArrayConfig, StoreConfig};

fn paged_store(count: i64, limit: u32) -> Store {
    Store::array(
        StoreConfig::default().primary_keys(["id"]).page(1).limit(limit),
        ArrayConfig::new(
            ["id", "name"],
            (1..=count).map(|i| json!([i, format!("row {}", i)])).collect(),
        ),
    )
}

fn first_id(store: &Store) -> String {
    store.records()[0].value("id").to_string()
}

#[tokio::test]
async fn test_navigation_reloads_pages() {
    let store = paged_store(5, 2);
    store.load().await;
    let pagination = Pagination::new(store.clone());
    assert_eq!(pagination.page(), 1);
    assert_eq!(pagination.page_count(), 3);
    assert_eq!(pagination.range_text(), "1-2 of 5");

    assert!(pagination.next().await);
    assert_eq!(pagination.page(), 2);
    assert_eq!(first_id(&store), "3");
    assert_eq!(pagination.range_text(), "3-4 of 5");

    assert!(pagination.last().await);
    assert_eq!(pagination.page(), 3);
    assert_eq!(pagination.range_text(), "5-5 of 5");
    assert!(!pagination.next().await);

    assert!(pagination.prev().await);
    assert_eq!(pagination.page(), 2);

    assert!(pagination.first().await);
    assert_eq!(first_id(&store), "1");
    assert!(!pagination.prev().await);
}

#[tokio::test]
async fn test_goto_clamps_to_page_range() {
    let store = paged_store(5, 2);
    store.load().await;
    let pagination = Pagination::new(store.clone());

    assert!(pagination.goto(99).await);
    assert_eq!(pagination.page(), 3);
    assert!(pagination.goto(0).await);
    assert_eq!(pagination.page(), 1);
    assert!(!pagination.goto(1).await);
}

#[tokio::test]
async fn test_empty_store_text() {
    let store = paged_store(0, 2);
    store.load().await;
    let pagination = Pagination::new(store);
    assert_eq!(pagination.range_text(), "0-0 of 0");
    assert_eq!(pagination.page_count(), 1);
    assert!(!pagination.next().await);
}

#[tokio::test]
async fn test_render_disables_edge_buttons() {
    let store = paged_store(5, 2);
    store.load().await;
    let pagination = Pagination::new(store);

    let view = pagination.render();
    assert_eq!(view.page, 1);
    assert_eq!(view.page_count, 3);
    assert_eq!(view.text, "1-2 of 5");
    let disabled = |item: ToolItem| {
        view.items
            .iter()
            .find(|t| t.item == item)
            .map(|t| t.disabled)
            .unwrap()
    };
    assert!(disabled(ToolItem::First));
    assert!(disabled(ToolItem::Prev));
    assert!(!disabled(ToolItem::Next));
    assert!(!disabled(ToolItem::Last));

    let page = view.items.iter().find(|t| t.item == ToolItem::Page).unwrap();
    assert_eq!(page.text, "1 / 3");
}

#[tokio::test]
async fn test_disabled_toolbar_does_nothing() {
    let store = paged_store(5, 2);
    store.load().await;
    let pagination = Pagination::new(store.clone());
    pagination.set_disabled(true);

    assert!(!pagination.next().await);
    assert_eq!(pagination.page(), 1);
    let view = pagination.render();
    assert!(view.disabled);
    assert!(view.items.iter().all(|t| t.disabled));
}

#[tokio::test]
async fn test_custom_items_keep_their_position() {
    let store = paged_store(5, 2);
    store.load().await;
    let pagination = Pagination::new(store);
    let refresh = ToolItem::Button {
        id: "refresh".into(),
        text: "Refresh".into(),
    };
    assert_eq!(pagination.add_item(refresh.clone(), Some(-1)), 7);

    let view = pagination.render();
    assert_eq!(view.items[7].item, refresh);
    assert_eq!(view.items[7].text, "Refresh");
    assert_eq!(view.items.last().unwrap().item, ToolItem::Info);
}
