//! Grid panel and its parts.

mod column;
mod layout;
mod menu;
mod panel;
mod render;
mod selection;

pub use column::{Align, Cell, CellArgs, Column, ColumnConfig, ColumnLayout, Renderer, VerticalAlign};
pub use layout::FreezeLayout;
pub use menu::{Menu, MenuItem};
pub use panel::{Grid, GridConfig, GridEvent, GridListener, GridListenerId, Hit};
pub use render::{BodyCell, BodyRow, Footer, GridView, HeaderCell, ScrollbarView};
pub use selection::{Selection, SelectionMode, same_selection};
