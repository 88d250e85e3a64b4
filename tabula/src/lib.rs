//! Headless data-grid components.
//!
//! Components own their state and layout arithmetic and produce a plain
//! render model; drawing it is left to the host.

pub mod component;
pub mod events;
pub mod grid;
pub mod items;
pub mod pagination;
pub mod scrollbar;

pub use tabula_lib;

pub mod prelude {
    pub use crate::component::{Component, ComponentState};
    pub use crate::events::{
        DeltaMode, EventResult, Key, KeyEvent, Modifiers, PointerButton, PointerEvent, WheelEvent,
    };
    pub use crate::grid::{
        Align, Column, ColumnConfig, Grid, GridConfig, GridEvent, GridView, Menu, MenuItem,
        SelectionMode, VerticalAlign,
    };
    pub use crate::items::Items;
    pub use crate::pagination::{Pagination, PaginationView};
    pub use crate::scrollbar::{Axis, FrameLoop, Scrollbar, ScrollbarConfig};

    pub use tabula_lib::Store;
    pub use tabula_lib::model::{Direction, Filter, FilterMode, Record, Sorter, Value};
}
