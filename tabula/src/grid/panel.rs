//! Grid panel: a store-bound table with selection, frozen columns,
//! keyboard focus, column resizing and a momentum scrollbar.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use serde::Deserialize;
use tabula_lib::Store;
use tabula_lib::model::{Direction, Record, Sorter};
use tabula_lib::store::{ListenerId, StoreEvent};

use super::layout::{self, FreezeLayout};
use super::render::{self, GridView, RowBuilder, ScrollbarView};
use super::selection::{Selection, SelectionMode, same_selection};
use super::{Cell, Column, ColumnConfig, Menu};
use crate::component::{Component, ComponentState};
use crate::events::{EventResult, Key, KeyEvent, PointerButton, PointerEvent, WheelEvent};
use crate::scrollbar::{Axis, FrameLoop, Scrollbar, ScrollbarConfig};

/// Grab zone around a header's right edge, in pixels.
const RESIZE_HANDLE: f64 = 4.0;
/// Distance from the scrollable edges where a resize drag starts
/// auto-scrolling; also the top auto-scroll speed.
const AUTO_SCROLL_ZONE: f64 = 15.0;
/// Smallest width a resize drag can produce for a column without `min_width`.
const MIN_COLUMN_WIDTH: f64 = 20.0;

// =============================================================================
// Configuration
// =============================================================================

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub selection_mode: SelectionMode,
    /// Number of top-level headers pinned to the left edge.
    pub freeze: usize,
    pub row_height: f64,
    pub header_height: f64,
    pub scrollbar: ScrollbarConfig,
    /// Declarative columns, appended after any columns passed to
    /// [`Grid::new`].
    pub columns: Vec<ColumnConfig>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::default(),
            freeze: 0,
            row_height: 28.0,
            header_height: 32.0,
            scrollbar: ScrollbarConfig::default(),
            columns: Vec::new(),
        }
    }
}

impl GridConfig {
    pub fn selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn freeze(mut self, headers: usize) -> Self {
        self.freeze = headers;
        self
    }

    pub fn row_height(mut self, px: f64) -> Self {
        self.row_height = px;
        self
    }

    pub fn header_height(mut self, px: f64) -> Self {
        self.header_height = px;
        self
    }

    pub fn scrollbar(mut self, config: ScrollbarConfig) -> Self {
        self.scrollbar = config;
        self
    }

    pub fn column(mut self, column: ColumnConfig) -> Self {
        self.columns.push(column);
        self
    }
}

// =============================================================================
// Events
// =============================================================================

/// Events a grid fires to its listeners.
#[derive(Debug)]
pub enum GridEvent<'a> {
    /// The selection changed; carries the new selection.
    SelectionChange(&'a [Arc<Record>]),
    /// A row was activated (double click or Enter).
    OpenItem {
        record: &'a Arc<Record>,
        index: usize,
    },
    /// A context menu is about to open. Listeners add items to `menu`; an
    /// empty menu is discarded.
    OpenMenu {
        menu: &'a mut Menu,
        record: &'a Arc<Record>,
        index: usize,
    },
    /// The bound store finished loading and the body was rebuilt.
    Load,
    /// The bound store's view changed and the body was rebuilt.
    Update,
}

pub type GridListener = Arc<dyn Fn(&mut GridEvent<'_>) + Send + Sync>;

/// Handle returned by [`Grid::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridListenerId(usize);

/// What lies under a point of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hit {
    /// A header cell; `leaf` is `None` over a group header row.
    Header { leaf: Option<usize> },
    /// The resize handle of a leaf header.
    Resizer { leaf: usize },
    Cell { row: usize, column: usize },
    Scrollbar(Axis),
    /// Body area below the last row.
    Body,
    #[default]
    Outside,
}

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct ResizeDrag {
    leaf: usize,
    pinned: bool,
    start_width: f64,
    /// Pointer position at drag start; content coordinates unless pinned.
    start_x: f64,
    pointer_x: f64,
}

struct GridInner {
    config: GridConfig,
    headers: Vec<Column>,
    selection: Selection,
    records: Vec<Arc<Record>>,
    /// Rendered cells per record, per leaf.
    body: Vec<Vec<Cell>>,
    focused: Option<(usize, usize)>,
    freeze: FreezeLayout,
    width: f64,
    height: f64,
    resize: Option<ResizeDrag>,
    menu: Option<Menu>,
}

impl GridInner {
    fn leaves(&self) -> Vec<&Column> {
        layout::leaves(&self.headers)
    }

    fn widths(&self) -> Vec<f64> {
        layout::leaf_widths(&self.headers, self.width)
    }

    fn content_width(&self) -> f64 {
        self.widths().iter().sum()
    }

    fn content_height(&self) -> f64 {
        self.config.header_height + self.records.len() as f64 * self.config.row_height
    }

    fn visible_leaves(&self) -> Vec<usize> {
        self.leaves()
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_hidden())
            .map(|(i, _)| i)
            .collect()
    }

    /// Leaf under screen position `x`. Pinned leaves sit on top.
    fn leaf_at(&self, x: f64, scroll_x: f64) -> Option<usize> {
        let leaves = self.leaves();
        let widths = self.widths();
        let lefts = render::leaf_lefts(&widths);

        let pinned = leaves.iter().enumerate().find(|(i, c)| {
            let left = c.layout.sticky_left.unwrap_or(lefts[*i]);
            c.layout.pinned && !c.is_hidden() && x >= left && x < left + widths[*i]
        });
        if let Some((i, _)) = pinned {
            return Some(i);
        }
        leaves
            .iter()
            .enumerate()
            .find(|(i, c)| {
                let left = lefts[*i] - scroll_x;
                !c.layout.pinned && !c.is_hidden() && x >= left && x < left + widths[*i]
            })
            .map(|(i, _)| i)
    }

    /// Screen right edge of a leaf.
    fn leaf_right(&self, leaf: usize, scroll_x: f64) -> Option<f64> {
        let widths = self.widths();
        let lefts = render::leaf_lefts(&widths);
        let column = *self.leaves().get(leaf)?;
        let left = if column.layout.pinned {
            column.layout.sticky_left.unwrap_or(lefts[leaf])
        } else {
            lefts[leaf] - scroll_x
        };
        Some(left + widths[leaf])
    }

    /// Refreshes flex caches along `path` and re-freezes when the change
    /// touches the frozen region. Returns `true` if the freeze was redone.
    fn update_layout(&mut self, path: &[usize]) -> bool {
        layout::refresh_path(&mut self.headers, path);
        let pinned = (1..=path.len())
            .any(|depth| layout::node(&self.headers, &path[..depth]).is_some_and(|c| c.layout.pinned));
        let frozen = path.first().is_some_and(|top| *top < self.config.freeze);
        if pinned || frozen {
            self.freeze = layout::apply_freeze(&mut self.headers, self.config.freeze);
            true
        } else {
            false
        }
    }

    fn update_leaf(&mut self, leaf: usize, f: impl FnOnce(&mut Column)) -> bool {
        let Some(path) = layout::leaf_path(&self.headers, leaf) else {
            return false;
        };
        if let Some(column) = layout::node_mut(&mut self.headers, &path) {
            f(column);
        }
        self.update_layout(&path);
        true
    }
}

struct GridShared {
    inner: RwLock<GridInner>,
    store: Store,
    scrollbar: Scrollbar,
    state: ComponentState,
    dirty: AtomicBool,
    listeners: RwLock<Vec<(GridListenerId, GridListener)>>,
    next_listener: AtomicUsize,
    frames: Mutex<Option<FrameLoop>>,
    store_listener: Mutex<Option<ListenerId>>,
}

impl Drop for GridShared {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.store_listener.lock()
            && let Some(id) = guard.take()
        {
            self.store.off(id);
        }
    }
}

// =============================================================================
// Grid
// =============================================================================

/// A table bound to a [`Store`].
///
/// `Grid` is a cheap handle; clones share state. The body is rebuilt on
/// every store load or update, and the selection is carried across by
/// primary key.
#[derive(Clone)]
pub struct Grid {
    shared: Arc<GridShared>,
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("store", &self.shared.store)
            .field("scrollbar", &self.shared.scrollbar)
            .finish_non_exhaustive()
    }
}

impl Grid {
    /// Creates a grid over `store`.
    ///
    /// `config.columns` are appended to `headers`. If the store is already
    /// loaded the body is built right away.
    pub fn new(store: Store, headers: Vec<Column>, mut config: GridConfig) -> Self {
        let mut headers = headers;
        headers.extend(config.columns.drain(..).map(Column::from_config));
        for header in &mut headers {
            header.refresh_flex_tree();
        }
        let freeze = layout::apply_freeze(&mut headers, config.freeze);
        let scrollbar = Scrollbar::new(config.scrollbar.clone());
        let selection = Selection::new(config.selection_mode);

        let grid = Self {
            shared: Arc::new(GridShared {
                inner: RwLock::new(GridInner {
                    config,
                    headers,
                    selection,
                    records: Vec::new(),
                    body: Vec::new(),
                    focused: None,
                    freeze,
                    width: 0.0,
                    height: 0.0,
                    resize: None,
                    menu: None,
                }),
                store,
                scrollbar,
                state: ComponentState::new(),
                dirty: AtomicBool::new(true),
                listeners: RwLock::new(Vec::new()),
                next_listener: AtomicUsize::new(0),
                frames: Mutex::new(None),
                store_listener: Mutex::new(None),
            }),
        };

        let weak = Arc::downgrade(&grid.shared);
        let id = grid.shared.store.on(move |event| {
            if let Some(shared) = weak.upgrade() {
                Grid { shared }.on_store_event(event);
            }
        });
        if let Ok(mut guard) = grid.shared.store_listener.lock() {
            *guard = Some(id);
        }

        if grid.shared.store.is_loaded() {
            grid.rebuild();
        }
        grid
    }

    /// Creates a grid whose columns all come from `config.columns`.
    pub fn from_config(store: Store, config: GridConfig) -> Self {
        Self::new(store, Vec::new(), config)
    }

    fn read<T: Default>(&self, f: impl FnOnce(&GridInner) -> T) -> T {
        self.shared.inner.read().map(|g| f(&g)).unwrap_or_default()
    }

    fn write<T: Default>(&self, f: impl FnOnce(&mut GridInner) -> T) -> T {
        self.shared
            .inner
            .write()
            .map(|mut g| f(&mut g))
            .unwrap_or_default()
    }

    fn mark_dirty(&self) {
        self.shared.dirty.store(true, Ordering::SeqCst);
    }

    /// Returns and clears the "needs render" flag, including the scrollbar's.
    pub fn take_dirty(&self) -> bool {
        let grid = self.shared.dirty.swap(false, Ordering::SeqCst);
        let scrollbar = self.shared.scrollbar.take_dirty();
        grid || scrollbar
    }

    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    pub fn scrollbar(&self) -> &Scrollbar {
        &self.shared.scrollbar
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Registers a listener.
    ///
    /// Listeners run on the thread that triggered the event and may call
    /// back into the grid; events raised from inside a listener are
    /// dispatched to every listener before the outer dispatch resumes.
    pub fn on(
        &self,
        listener: impl Fn(&mut GridEvent<'_>) + Send + Sync + 'static,
    ) -> GridListenerId {
        let id = GridListenerId(self.shared.next_listener.fetch_add(1, Ordering::SeqCst));
        if let Ok(mut guard) = self.shared.listeners.write() {
            guard.push((id, Arc::new(listener)));
        }
        id
    }

    pub fn off(&self, id: GridListenerId) {
        if let Ok(mut guard) = self.shared.listeners.write() {
            guard.retain(|(existing, _)| *existing != id);
        }
    }

    fn emit(&self, mut event: GridEvent<'_>) {
        let listeners: Vec<GridListener> = self
            .shared
            .listeners
            .read()
            .map(|g| g.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();
        log::trace!("grid event {:?} -> {} listeners", event, listeners.len());
        for listener in listeners {
            listener(&mut event);
        }
    }

    fn on_store_event(&self, event: StoreEvent) {
        match event {
            StoreEvent::BeforeLoad => self.mark_dirty(),
            StoreEvent::Load | StoreEvent::Update => {
                self.rebuild();
                self.restore_selections();
                self.emit(if event == StoreEvent::Load {
                    GridEvent::Load
                } else {
                    GridEvent::Update
                });
            }
        }
    }

    /// Re-renders every body cell from the store's current view.
    fn rebuild(&self) {
        let records = self.shared.store.records();
        let body: Vec<Vec<Cell>> = self.read(|g| {
            let leaves = g.leaves();
            records
                .iter()
                .enumerate()
                .map(|(row, record)| {
                    leaves
                        .iter()
                        .enumerate()
                        .map(|(i, column)| column.render_cell(record, row, i))
                        .collect()
                })
                .collect()
        });
        log::debug!("grid body rebuilt: {} rows", records.len());
        self.write(|g| {
            g.body = body;
            g.records = records;
            if g.focused.is_some_and(|(row, _)| row >= g.records.len()) {
                g.focused = None;
            }
        });
        self.sync_scroll();
        self.mark_dirty();
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Applies `f` to the selection and fires `SelectionChange` if the
    /// result differs by reference. Returns whether it did.
    fn change_selection(&self, f: impl FnOnce(&mut Selection, &[Arc<Record>])) -> bool {
        let changed = self.write(|g| {
            let before = g.selection.records().to_vec();
            f(&mut g.selection, &g.records);
            let after = g.selection.records().to_vec();
            (!same_selection(&before, &after)).then_some(after)
        });
        match changed {
            Some(selection) => {
                self.mark_dirty();
                self.emit(GridEvent::SelectionChange(&selection));
                true
            }
            None => false,
        }
    }

    /// Matches the selection against freshly loaded records; unmatched
    /// records are dropped.
    fn restore_selections(&self) {
        self.change_selection(|selection, records| selection.restore(records));
    }

    /// Applies a select action to row `index`; see [`Selection::select`].
    pub fn select(&self, index: usize, keep: bool) -> bool {
        self.change_selection(|selection, records| {
            if let Some(record) = records.get(index) {
                selection.select(Arc::clone(record), keep);
            }
        })
    }

    pub fn deselect(&self, index: usize) -> bool {
        self.change_selection(|selection, records| {
            if let Some(record) = records.get(index) {
                selection.remove(record);
            }
        })
    }

    /// Selects every row, as far as the selection mode allows.
    pub fn select_all(&self) -> bool {
        self.change_selection(|selection, records| selection.set(records.to_vec()))
    }

    pub fn clear_selection(&self) -> bool {
        self.change_selection(|selection, _| selection.clear())
    }

    /// Selected records, in selection order.
    pub fn selections(&self) -> Vec<Arc<Record>> {
        self.read(|g| g.selection.records().to_vec())
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.read(|g| {
            g.records
                .get(index)
                .is_some_and(|record| g.selection.contains(record))
        })
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.read(|g| g.selection.mode)
    }

    /// Switches the selection mode and clears the selection.
    pub fn set_selection_mode(&self, mode: SelectionMode) {
        self.write(|g| g.selection.mode = mode);
        self.clear_selection();
    }

    // -------------------------------------------------------------------------
    // Columns and layout
    // -------------------------------------------------------------------------

    /// Top-level headers.
    pub fn headers(&self) -> Vec<Column> {
        self.read(|g| g.headers.clone())
    }

    /// Leaf columns, in display order.
    pub fn columns(&self) -> Vec<Column> {
        self.read(|g| g.leaves().into_iter().cloned().collect())
    }

    pub fn column(&self, leaf: usize) -> Option<Column> {
        self.read(|g| g.leaves().get(leaf).map(|c| (*c).clone()))
    }

    /// Current width of every leaf.
    pub fn column_widths(&self) -> Vec<f64> {
        self.read(GridInner::widths)
    }

    pub fn set_column_width(&self, leaf: usize, width: f64) -> bool {
        let updated = self.write(|g| g.update_leaf(leaf, |c| c.width = Some(width)));
        if updated {
            self.sync_scroll();
            self.mark_dirty();
        }
        updated
    }

    pub fn set_column_hidden(&self, leaf: usize, hidden: bool) -> bool {
        let updated = self.write(|g| g.update_leaf(leaf, |c| c.hidden = hidden));
        if updated {
            log::debug!("column {} hidden={}", leaf, hidden);
            self.sync_scroll();
            self.mark_dirty();
        }
        updated
    }

    /// Pins the first `headers` top-level headers.
    pub fn set_freeze_column(&self, headers: usize) -> FreezeLayout {
        let freeze = self.write(|g| {
            g.config.freeze = headers;
            g.freeze = layout::apply_freeze(&mut g.headers, headers);
            g.freeze
        });
        self.mark_dirty();
        freeze
    }

    pub fn freeze(&self) -> FreezeLayout {
        self.read(|g| g.freeze)
    }

    /// Total minimum width of the pinned columns.
    pub fn freeze_width(&self) -> f64 {
        self.read(|g| g.freeze.freeze_width)
    }

    /// Sets the outer size of the grid in pixels.
    pub fn set_size(&self, width: f64, height: f64) {
        self.write(|g| {
            g.width = width.max(0.0);
            g.height = height.max(0.0);
        });
        self.sync_scroll();
        self.mark_dirty();
    }

    fn sync_scroll(&self) {
        let (width, height, content_width, content_height) = self.read(|g| {
            (g.width, g.height, g.content_width(), g.content_height())
        });
        let scrollbar = &self.shared.scrollbar;
        scrollbar.set_content(Axis::X, content_width);
        scrollbar.set_content(Axis::Y, content_height);
        scrollbar.set_viewport(Axis::X, width);
        scrollbar.set_viewport(Axis::Y, height);
    }

    // -------------------------------------------------------------------------
    // Focus
    // -------------------------------------------------------------------------

    /// Focused `(row, leaf)`.
    pub fn focused(&self) -> Option<(usize, usize)> {
        self.read(|g| g.focused)
    }

    /// Focuses a cell and scrolls it into view.
    pub fn focus_cell(&self, row: usize, column: usize) {
        self.write(|g| g.focused = Some((row, column)));
        self.focus_row(row);
        self.focus_column(column);
        self.mark_dirty();
    }

    /// Scrolls row `row` into view below the header.
    pub fn focus_row(&self, row: usize) {
        let (header, row_height, height) = self.read(|g| {
            (g.config.header_height, g.config.row_height, g.height)
        });
        let scrollbar = &self.shared.scrollbar;
        let position = scrollbar.position(Axis::Y);
        let top = header + row as f64 * row_height;
        let bottom = top + row_height;
        if top - position < header {
            scrollbar.scroll_to(Axis::Y, top - header);
        } else if bottom > position + height {
            scrollbar.scroll_to(Axis::Y, bottom - height);
        }
    }

    /// Scrolls leaf `column` into view right of the pinned region. Pinned
    /// columns are always in view.
    pub fn focus_column(&self, column: usize) {
        let extent = self.read(|g| {
            let leaves = g.leaves();
            let leaf = leaves.get(column)?;
            if leaf.layout.pinned || leaf.is_hidden() {
                return None;
            }
            let widths = g.widths();
            let left: f64 = widths[..column].iter().sum();
            Some((left, left + widths[column], g.freeze.freeze_width, g.width))
        });
        let Some((left, right, freeze_width, width)) = extent else {
            return;
        };
        let scrollbar = &self.shared.scrollbar;
        let position = scrollbar.position(Axis::X);
        if left - position < freeze_width {
            scrollbar.scroll_to(Axis::X, left - freeze_width);
        } else if right > position + width {
            scrollbar.scroll_to(Axis::X, right - width);
        }
    }

    // -------------------------------------------------------------------------
    // Items and menus
    // -------------------------------------------------------------------------

    /// Activates row `index`, selecting it first if needed.
    pub fn open_item(&self, index: usize) -> bool {
        let Some(record) = self.read(|g| g.records.get(index).cloned()) else {
            return false;
        };
        if !self.is_selected(index) {
            self.select(index, false);
        }
        self.emit(GridEvent::OpenItem {
            record: &record,
            index,
        });
        true
    }

    /// Opens a context menu for row `index` at `(x, y)`.
    ///
    /// Listeners populate the menu through [`GridEvent::OpenMenu`]; if none
    /// adds an item the menu is discarded and `None` returned.
    pub fn open_menu(&self, index: usize, x: f64, y: f64) -> Option<Menu> {
        let record = self.read(|g| g.records.get(index).cloned())?;
        if !self.is_selected(index) {
            self.select(index, false);
        }

        let mut menu = Menu::new();
        self.emit(GridEvent::OpenMenu {
            menu: &mut menu,
            record: &record,
            index,
        });
        if menu.is_empty() {
            log::trace!("context menu for row {} is empty", index);
            self.write(|g| g.menu = None);
            return None;
        }

        menu.show_at(x, y);
        self.write(|g| g.menu = Some(menu.clone()));
        self.mark_dirty();
        Some(menu)
    }

    /// The open context menu.
    pub fn menu(&self) -> Option<Menu> {
        self.read(|g| g.menu.clone())
    }

    pub fn close_menu(&self) {
        if self.write(|g| g.menu.take().is_some()) {
            self.mark_dirty();
        }
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Sorts the store by leaf `leaf`: the same field flips direction,
    /// another field starts ascending. Returns `false` if the column is not
    /// sortable.
    pub async fn toggle_sort(&self, leaf: usize) -> bool {
        let field = self.read(|g| {
            g.leaves()
                .get(leaf)
                .filter(|c| c.sortable)
                .and_then(|c| c.data_index.clone())
        });
        let Some(field) = field else {
            return false;
        };

        let direction = self
            .shared
            .store
            .sorters()
            .into_iter()
            .find(|s| s.field == field)
            .map(|s| s.direction.toggle())
            .unwrap_or(Direction::Asc);
        log::debug!("sort by {} {:?}", field, direction);
        self.shared
            .store
            .sort_by(vec![Sorter::new(field, direction)])
            .await;
        true
    }

    fn spawn_sort(&self, leaf: usize) -> EventResult {
        let sortable = self.read(|g| {
            g.leaves()
                .get(leaf)
                .is_some_and(|c| c.sortable && c.data_index.is_some())
        });
        if !sortable {
            return EventResult::Ignored;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let grid = self.clone();
                handle.spawn(async move {
                    grid.toggle_sort(leaf).await;
                });
                EventResult::Consumed
            }
            Err(_) => {
                log::warn!("header sort requested outside a tokio runtime");
                EventResult::Ignored
            }
        }
    }

    // -------------------------------------------------------------------------
    // Resizing
    // -------------------------------------------------------------------------

    pub fn is_resizing(&self) -> bool {
        self.read(|g| g.resize.is_some())
    }

    /// Starts resizing leaf `leaf` with the pointer at screen `x`.
    pub fn begin_resize(&self, leaf: usize, x: f64) -> EventResult {
        let scroll_x = self.shared.scrollbar.position(Axis::X);
        let started = self.write(|g| {
            let widths = g.widths();
            let Some(column) = g.leaves().get(leaf).copied() else {
                return false;
            };
            if !column.resizable || column.is_hidden() {
                return false;
            }
            let pinned = column.layout.pinned;
            g.resize = Some(ResizeDrag {
                leaf,
                pinned,
                start_width: widths[leaf],
                start_x: if pinned { x } else { x + scroll_x },
                pointer_x: x,
            });
            true
        });
        if started {
            log::debug!("resize column {} started", leaf);
            EventResult::StartDrag
        } else {
            EventResult::Ignored
        }
    }

    /// Moves an active resize to screen `x`.
    ///
    /// The width follows the pointer in content coordinates, so it keeps
    /// growing while the body auto-scrolls. Near the left edge of the
    /// scrollable region or the right edge of the grid the body auto-scrolls
    /// at up to [`AUTO_SCROLL_ZONE`] pixels per frame.
    pub fn resize_to(&self, x: f64) -> EventResult {
        let scroll_x = self.shared.scrollbar.position(Axis::X);
        let speed = self.write(|g| {
            let drag = g.resize.as_mut()?;
            drag.pointer_x = x;
            let drag = *drag;

            let floor = g
                .leaves()
                .get(drag.leaf)
                .and_then(|c| c.min_width)
                .unwrap_or(MIN_COLUMN_WIDTH);
            let content_x = if drag.pinned { x } else { x + scroll_x };
            let width = (drag.start_width + content_x - drag.start_x).max(floor);
            g.update_leaf(drag.leaf, |c| c.width = Some(width));

            let left_edge = g.freeze.freeze_width + AUTO_SCROLL_ZONE;
            let right_edge = g.width - AUTO_SCROLL_ZONE;
            let speed = if !drag.pinned && x < left_edge {
                -(left_edge - x).min(AUTO_SCROLL_ZONE)
            } else if x > right_edge {
                (x - right_edge).min(AUTO_SCROLL_ZONE)
            } else {
                0.0
            };
            Some(speed)
        });
        let Some(speed) = speed else {
            return EventResult::Ignored;
        };
        self.sync_scroll();
        self.shared.scrollbar.set_auto_scroll(Axis::X, speed);
        self.mark_dirty();
        EventResult::Consumed
    }

    /// Commits the dragged width and stops auto-scrolling.
    pub fn end_resize(&self) -> EventResult {
        let Some(drag) = self.write(|g| g.resize.take()) else {
            return EventResult::Ignored;
        };
        self.shared.scrollbar.set_auto_scroll(Axis::X, 0.0);
        let width = self.column_widths().get(drag.leaf).copied().unwrap_or(0.0);
        self.set_column_width(drag.leaf, width);
        log::debug!("resize column {} committed at {}px", drag.leaf, width);
        EventResult::Consumed
    }

    // -------------------------------------------------------------------------
    // Frames
    // -------------------------------------------------------------------------

    /// Advances the scrollbar one frame. Returns `true` if anything moved.
    pub fn tick(&self, now: Instant) -> bool {
        let moved = self.shared.scrollbar.tick(now);
        if moved {
            self.after_frame();
        }
        moved
    }

    fn after_frame(&self) {
        if let Some(x) = self.read(|g| g.resize.map(|d| d.pointer_x)) {
            self.resize_to(x);
        }
        self.mark_dirty();
    }

    /// Starts a frame loop on the current tokio runtime. Returns `false`
    /// outside a runtime.
    pub fn start_frames(&self) -> bool {
        let scrollbar = self.shared.scrollbar.clone();
        let interval = scrollbar.config().frame_interval;
        let weak = Arc::downgrade(&self.shared);
        let frames = FrameLoop::spawn(scrollbar, interval, move || {
            if let Some(shared) = weak.upgrade() {
                Grid { shared }.after_frame();
            }
        });
        match frames {
            Some(frames) => {
                if let Ok(mut guard) = self.shared.frames.lock() {
                    *guard = Some(frames);
                }
                true
            }
            None => {
                log::warn!("no tokio runtime; grid frames must be driven with tick()");
                false
            }
        }
    }

    /// Stops the frame loop and detaches from the store.
    pub fn dispose(&self) {
        if let Ok(mut guard) = self.shared.frames.lock()
            && let Some(mut frames) = guard.take()
        {
            frames.dispose();
        }
        if let Ok(mut guard) = self.shared.store_listener.lock()
            && let Some(id) = guard.take()
        {
            self.shared.store.off(id);
        }
        self.shared.scrollbar.set_auto_scroll(Axis::X, 0.0);
        self.shared.scrollbar.set_auto_scroll(Axis::Y, 0.0);
        log::debug!("grid disposed");
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// What lies under screen point `(x, y)`.
    pub fn hit_test(&self, x: f64, y: f64) -> Hit {
        let scrollbar = &self.shared.scrollbar;
        let scroll_x = scrollbar.position(Axis::X);
        let scroll_y = scrollbar.position(Axis::Y);
        let track = scrollbar.config().size;
        let overflow_x = scrollbar.geometry(Axis::X).is_some();
        let overflow_y = scrollbar.geometry(Axis::Y).is_some();

        self.read(|g| {
            if x < 0.0 || y < 0.0 || x >= g.width || y >= g.height {
                return Hit::Outside;
            }
            if overflow_y && x >= g.width - track {
                return Hit::Scrollbar(Axis::Y);
            }
            if overflow_x && y >= g.height - track {
                return Hit::Scrollbar(Axis::X);
            }

            let leaf = g.leaf_at(x, scroll_x);
            if y < g.config.header_height {
                let depth = g.headers.iter().map(Column::depth).max().unwrap_or(1);
                let row_height = g.config.header_height / depth as f64;
                let header_row = (y / row_height).floor() as usize;
                let Some(leaf) = leaf else {
                    return Hit::Header { leaf: None };
                };
                // A leaf's header cell spans down to the last header row
                // from its own depth.
                let leaf_row = layout::leaf_path(&g.headers, leaf).map_or(0, |p| p.len() - 1);
                if header_row < leaf_row {
                    return Hit::Header { leaf: None };
                }
                let resizable = g.leaves().get(leaf).is_some_and(|c| c.resizable);
                if resizable
                    && g.leaf_right(leaf, scroll_x)
                        .is_some_and(|right| x >= right - RESIZE_HANDLE)
                {
                    return Hit::Resizer { leaf };
                }
                return Hit::Header { leaf: Some(leaf) };
            }

            if g.config.row_height <= 0.0 {
                return Hit::Body;
            }
            let row = ((y - g.config.header_height + scroll_y) / g.config.row_height).floor();
            match leaf {
                Some(column) if row >= 0.0 && (row as usize) < g.records.len() => Hit::Cell {
                    row: row as usize,
                    column,
                },
                _ => Hit::Body,
            }
        })
    }

    pub fn handle_key(&self, event: &KeyEvent) -> EventResult {
        if !self.shared.state.is_interactive() {
            return EventResult::Ignored;
        }
        match event.key {
            Key::Up | Key::Down | Key::Left | Key::Right => self.move_focus(event.key),
            Key::Space => {
                let Some((row, _)) = self.focused() else {
                    return EventResult::Ignored;
                };
                let keep = self.selection_mode() == SelectionMode::Checkbox;
                self.select(row, keep);
                EventResult::Consumed
            }
            Key::Enter => {
                let Some((row, _)) = self.focused() else {
                    return EventResult::Ignored;
                };
                self.open_item(row);
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    /// Moves focus one step. Horizontal moves skip hidden columns and stop
    /// at the first and last visible one; the first arrow press focuses the
    /// top-left cell.
    fn move_focus(&self, key: Key) -> EventResult {
        let (visible, focused) = self.read(|g| (g.visible_leaves(), g.focused));
        let Some(&first) = visible.first() else {
            return EventResult::Ignored;
        };
        let Some((row, column)) = focused else {
            self.focus_cell(0, first);
            return EventResult::Consumed;
        };

        let last = visible.len() - 1;
        let at = visible.iter().position(|&c| c >= column).unwrap_or(last);
        let (row, column) = match key {
            Key::Up => (row.saturating_sub(1), visible[at]),
            Key::Down => (row + 1, visible[at]),
            Key::Left => (row, visible[at.saturating_sub(1)]),
            Key::Right => (row, visible[(at + 1).min(last)]),
            _ => (row, column),
        };
        self.focus_cell(row, column);
        EventResult::Consumed
    }

    pub fn on_pointer_down(&self, event: &PointerEvent, now: Instant) -> EventResult {
        if !self.shared.state.is_interactive() {
            return EventResult::Ignored;
        }
        let hit = self.hit_test(event.x, event.y);
        match event.button {
            PointerButton::Secondary => {
                return match hit {
                    Hit::Cell { row, .. } => {
                        self.open_menu(row, event.x, event.y);
                        EventResult::Consumed
                    }
                    _ => EventResult::Ignored,
                };
            }
            PointerButton::Middle => return EventResult::Ignored,
            PointerButton::Primary => {}
        }

        self.close_menu();
        match hit {
            Hit::Scrollbar(axis) => {
                let pos = match axis {
                    Axis::X => event.x,
                    Axis::Y => event.y,
                };
                self.shared.scrollbar.begin_drag(axis, pos, now)
            }
            Hit::Resizer { leaf } => self.begin_resize(leaf, event.x),
            Hit::Header { leaf: Some(leaf) } => self.spawn_sort(leaf),
            Hit::Cell { row, column } => {
                self.focus_cell(row, column);
                let keep = event.modifiers.extends_selection()
                    || self.selection_mode() == SelectionMode::Checkbox;
                self.select(row, keep);
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    pub fn on_double_click(&self, event: &PointerEvent) -> EventResult {
        if !self.shared.state.is_interactive() {
            return EventResult::Ignored;
        }
        match self.hit_test(event.x, event.y) {
            Hit::Cell { row, .. } => {
                self.open_item(row);
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    /// Routes pointer motion to an active resize or thumb drag, otherwise
    /// tracks hover.
    pub fn on_pointer_move(&self, event: &PointerEvent, now: Instant) -> EventResult {
        if self.is_resizing() {
            return self.resize_to(event.x);
        }
        let scrollbar = &self.shared.scrollbar;
        if let Some(axis) = scrollbar.drag_axis() {
            let pos = match axis {
                Axis::X => event.x,
                Axis::Y => event.y,
            };
            return scrollbar.drag_to(pos, now);
        }
        let inside = self.hit_test(event.x, event.y) != Hit::Outside;
        scrollbar.set_hover(inside, now);
        EventResult::Ignored
    }

    pub fn on_pointer_leave(&self, now: Instant) {
        self.shared.scrollbar.set_hover(false, now);
    }

    pub fn on_pointer_up(&self, _event: &PointerEvent, now: Instant) -> EventResult {
        if self.is_resizing() {
            return self.end_resize();
        }
        self.shared.scrollbar.end_drag(now)
    }

    pub fn on_wheel(&self, event: &WheelEvent, now: Instant) -> EventResult {
        if !self.shared.state.is_interactive() {
            return EventResult::Ignored;
        }
        self.shared.scrollbar.wheel(event, now)
    }
}

impl Component for Grid {
    type View = GridView;

    fn state(&self) -> &ComponentState {
        &self.shared.state
    }

    fn render(&self) -> GridView {
        let now = Instant::now();
        let scrollbar = &self.shared.scrollbar;
        let scroll_x = scrollbar.position(Axis::X);
        let scroll_y = scrollbar.position(Axis::Y);
        let sorters = self.shared.store.sorters();

        let mut view = self.read(|g| {
            let header_height = g.config.header_height;
            let row_height = g.config.row_height;
            let leaves = g.leaves();
            let widths = g.widths();
            let lefts = render::leaf_lefts(&widths);

            let len = g.records.len();
            let (first, end) = if row_height > 0.0 {
                let body_height = (g.height - header_height).max(0.0);
                let first = ((scroll_y / row_height).floor() as usize).min(len);
                let count = (body_height / row_height).ceil() as usize + 1;
                (first, (first + count).min(len))
            } else {
                (0, len)
            };

            let builder = RowBuilder {
                leaves: &leaves,
                widths: &widths,
                lefts: &lefts,
                header_height,
                row_height,
            };
            let rows = (first..end)
                .map(|i| {
                    let cells = g.body.get(i).map(Vec::as_slice).unwrap_or(&[]);
                    let selected = g.selection.contains(&g.records[i]);
                    builder.build(i, cells, selected, g.focused)
                })
                .collect();

            GridView {
                width: g.width,
                height: g.height,
                header_height,
                row_height,
                header: render::header_rows(&g.headers, &widths, &sorters),
                rows,
                scroll_x,
                scroll_y,
                content_width: widths.iter().sum(),
                content_height: g.content_height(),
                freeze: g.freeze,
                menu: g.menu.clone(),
                record_count: len,
                ..Default::default()
            }
        });

        view.hidden = self.shared.state.is_hidden();
        view.disabled = self.shared.state.is_disabled();
        view.loading = self.shared.store.is_loading();
        view.scrollbar = ScrollbarView {
            visible: scrollbar.is_visible(now),
            x: scrollbar.geometry(Axis::X),
            y: scrollbar.geometry(Axis::Y),
        };
        view
    }
}
