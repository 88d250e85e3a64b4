//! Paging toolbar bound to a store.

use std::sync::{Arc, RwLock};

use tabula_lib::Store;

use crate::component::{Component, ComponentState};
use crate::items::Items;

/// Toolbar entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolItem {
    First,
    Prev,
    /// Current page out of the page count.
    Page,
    Next,
    Last,
    /// Displayed range, "{from}-{to} of {total}".
    Info,
    Separator,
    /// Collaborator-supplied button.
    Button { id: String, text: String },
}

/// A rendered toolbar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolView {
    pub item: ToolItem,
    pub text: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationView {
    pub hidden: bool,
    pub disabled: bool,
    pub loading: bool,
    pub page: u32,
    pub page_count: u32,
    /// "{from}-{to} of {total}".
    pub text: String,
    pub items: Vec<ToolView>,
}

/// Navigation buttons and a range readout over a store's `page`/`limit`.
///
/// Navigation sets the store page and reloads. Everything is disabled while
/// the store is loading.
#[derive(Debug, Clone)]
pub struct Pagination {
    store: Store,
    state: ComponentState,
    items: Arc<RwLock<Items<ToolItem>>>,
}

impl Pagination {
    pub fn new(store: Store) -> Self {
        let items = [
            ToolItem::First,
            ToolItem::Prev,
            ToolItem::Separator,
            ToolItem::Page,
            ToolItem::Separator,
            ToolItem::Next,
            ToolItem::Last,
            ToolItem::Info,
        ]
        .into_iter()
        .collect();
        Self {
            store,
            state: ComponentState::new(),
            items: Arc::new(RwLock::new(items)),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Adds a toolbar entry; see [`Items::insert`] for `position`.
    pub fn add_item(&self, item: ToolItem, position: Option<isize>) -> usize {
        self.items
            .write()
            .map(|mut g| g.insert(item, position))
            .unwrap_or_default()
    }

    /// Current page, 1-based.
    pub fn page(&self) -> u32 {
        self.store.page().unwrap_or(1).max(1)
    }

    pub fn page_count(&self) -> u32 {
        self.store.page_count().unwrap_or(1)
    }

    /// Displayed record range, `"0-0 of 0"` when empty.
    pub fn range_text(&self) -> String {
        let total = self.store.total().unwrap_or(self.store.len() as u64);
        let shown = self.store.len() as u64;
        if total == 0 || shown == 0 {
            return format!("0-0 of {}", total);
        }
        let limit = self.store.limit().map(u64::from).unwrap_or(total);
        let from = (u64::from(self.page()) - 1) * limit + 1;
        let to = (from + shown - 1).min(total);
        format!("{}-{} of {}", from, to, total)
    }

    pub async fn first(&self) -> bool {
        self.goto(1).await
    }

    pub async fn prev(&self) -> bool {
        self.goto(self.page().saturating_sub(1)).await
    }

    pub async fn next(&self) -> bool {
        self.goto(self.page().saturating_add(1)).await
    }

    pub async fn last(&self) -> bool {
        self.goto(self.page_count()).await
    }

    /// Moves to `page`, clamped to `[1, page_count]`, and reloads.
    ///
    /// Returns `false` without reloading if the page would not change, the
    /// toolbar is disabled or a load is in flight.
    pub async fn goto(&self, page: u32) -> bool {
        if !self.state.is_interactive() || self.store.is_loading() {
            return false;
        }
        let target = page.clamp(1, self.page_count().max(1));
        if target == self.page() {
            return false;
        }
        log::debug!("page {} -> {}", self.page(), target);
        self.store.set_page(Some(target));
        self.store.reload().await
    }
}

impl Component for Pagination {
    type View = PaginationView;

    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn render(&self) -> PaginationView {
        let loading = self.store.is_loading();
        let disabled = self.state.is_disabled();
        let page = self.page();
        let page_count = self.page_count();
        let text = self.range_text();
        let locked = loading || disabled;

        let items = self
            .items
            .read()
            .map(|g| {
                g.iter()
                    .map(|item| {
                        let (label, off) = match item {
                            ToolItem::First => ("<<".to_string(), page <= 1),
                            ToolItem::Prev => ("<".to_string(), page <= 1),
                            ToolItem::Next => (">".to_string(), page >= page_count),
                            ToolItem::Last => (">>".to_string(), page >= page_count),
                            ToolItem::Page => (format!("{} / {}", page, page_count), false),
                            ToolItem::Info => (text.clone(), false),
                            ToolItem::Separator => (String::new(), false),
                            ToolItem::Button { text, .. } => (text.clone(), false),
                        };
                        ToolView {
                            item: item.clone(),
                            text: label,
                            disabled: locked || off,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        PaginationView {
            hidden: self.state.is_hidden(),
            disabled,
            loading,
            page,
            page_count,
            text,
            items,
        }
    }
}
