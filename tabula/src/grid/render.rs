//! Grid render model.
//!
//! Plain data the host draws. Positions are pixels in content coordinates;
//! pinned cells carry a sticky left offset instead.

use tabula_lib::model::{Direction, Sorter};

use super::layout::FreezeLayout;
use super::{Align, Cell, Column, ColumnLayout, Menu, VerticalAlign};
use crate::scrollbar::ScrollbarGeometry;

/// A header cell (leaf column or group).
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub text: String,
    /// Leaf number, for leaf headers.
    pub leaf: Option<usize>,
    pub row: usize,
    pub rowspan: usize,
    pub colspan: usize,
    pub left: f64,
    pub width: f64,
    pub align: Align,
    pub vertical_align: VerticalAlign,
    pub layout: ColumnLayout,
    pub sortable: bool,
    pub resizable: bool,
    /// Direction of the active sorter on this column.
    pub sort: Option<Direction>,
}

/// A body cell.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyCell {
    /// Leaf number.
    pub column: usize,
    pub left: f64,
    pub width: f64,
    pub cell: Cell,
    pub layout: ColumnLayout,
    pub focused: bool,
}

/// A body row.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyRow {
    /// Record index in the store view.
    pub index: usize,
    pub top: f64,
    pub selected: bool,
    pub focused: bool,
    pub cells: Vec<BodyCell>,
}

/// Footer; reserved, currently always empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Footer {
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollbarView {
    pub visible: bool,
    pub x: Option<ScrollbarGeometry>,
    pub y: Option<ScrollbarGeometry>,
}

/// Everything needed to draw a grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridView {
    pub hidden: bool,
    pub disabled: bool,
    /// A load is in flight.
    pub loading: bool,
    pub width: f64,
    pub height: f64,
    pub header_height: f64,
    pub row_height: f64,
    /// Header rows, top to bottom.
    pub header: Vec<Vec<HeaderCell>>,
    /// Rows intersecting the viewport.
    pub rows: Vec<BodyRow>,
    pub footer: Footer,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub content_width: f64,
    pub content_height: f64,
    pub freeze: FreezeLayout,
    pub scrollbar: ScrollbarView,
    pub menu: Option<Menu>,
    /// Total number of records.
    pub record_count: usize,
}

// =============================================================================
// Builders
// =============================================================================

/// Header rows for a column tree. Hidden columns are skipped; leaves span
/// down to the last row.
pub(crate) fn header_rows(headers: &[Column], widths: &[f64], sorters: &[Sorter]) -> Vec<Vec<HeaderCell>> {
    let depth = headers.iter().map(Column::depth).max().unwrap_or(0);
    let mut rows = vec![Vec::new(); depth];
    let mut walk = HeaderWalk {
        depth,
        widths,
        sorters,
        leaf: 0,
        left: 0.0,
    };
    for header in headers {
        walk.push(header, 0, &mut rows);
    }
    rows
}

struct HeaderWalk<'a> {
    depth: usize,
    widths: &'a [f64],
    sorters: &'a [Sorter],
    leaf: usize,
    left: f64,
}

impl HeaderWalk<'_> {
    fn push(&mut self, column: &Column, row: usize, rows: &mut [Vec<HeaderCell>]) {
        let first_leaf = self.leaf;
        let start = self.left;

        if column.is_group() {
            for child in column.children() {
                self.push(child, row + 1, rows);
            }
        } else {
            self.left += self.widths.get(self.leaf).copied().unwrap_or(0.0);
            self.leaf += 1;
        }

        if column.is_hidden() {
            return;
        }

        let group = column.is_group();
        let sort = column.data_index.as_deref().and_then(|field| {
            self.sorters
                .iter()
                .find(|s| s.field == field)
                .map(|s| s.direction)
        });
        let cell = HeaderCell {
            text: column.text.clone(),
            leaf: (!group).then_some(first_leaf),
            row,
            rowspan: if group { 1 } else { self.depth - row },
            colspan: column.visible_leaf_count(),
            left: start,
            width: self.left - start,
            align: column.header_align,
            vertical_align: column.header_vertical_align,
            layout: column.layout,
            sortable: !group && column.sortable && column.data_index.is_some(),
            resizable: !group && column.resizable,
            sort: if group { None } else { sort },
        };
        if let Some(cells) = rows.get_mut(row) {
            cells.push(cell);
        }
    }
}

/// Left edge of every leaf in content coordinates.
pub(crate) fn leaf_lefts(widths: &[f64]) -> Vec<f64> {
    let mut left = 0.0;
    widths
        .iter()
        .map(|w| {
            let at = left;
            left += w;
            at
        })
        .collect()
}

/// Assembles one body row from its rendered cells.
pub(crate) struct RowBuilder<'a> {
    pub leaves: &'a [&'a Column],
    pub widths: &'a [f64],
    pub lefts: &'a [f64],
    pub header_height: f64,
    pub row_height: f64,
}

impl RowBuilder<'_> {
    pub fn build(
        &self,
        index: usize,
        cells: &[Cell],
        selected: bool,
        focused: Option<(usize, usize)>,
    ) -> BodyRow {
        let focused_column = focused.and_then(|(row, col)| (row == index).then_some(col));
        let cells = self
            .leaves
            .iter()
            .enumerate()
            .filter(|(_, column)| !column.is_hidden())
            .map(|(leaf, column)| BodyCell {
                column: leaf,
                left: self.lefts.get(leaf).copied().unwrap_or(0.0),
                width: self.widths.get(leaf).copied().unwrap_or(0.0),
                cell: cells.get(leaf).cloned().unwrap_or_default(),
                layout: column.layout,
                focused: focused_column == Some(leaf),
            })
            .collect();

        BodyRow {
            index,
            top: self.header_height + index as f64 * self.row_height,
            selected,
            focused: focused_column.is_some(),
            cells,
        }
    }
}
