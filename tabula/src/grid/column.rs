//! Grid column tree.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tabula_lib::model::{Record, Value};

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Body cell handle passed to renderers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub text: String,
    pub classes: Vec<String>,
    pub title: Option<String>,
    pub align: Align,
    pub vertical_align: VerticalAlign,
}

/// What a renderer gets to see.
#[derive(Debug)]
pub struct CellArgs<'a> {
    pub value: &'a Value,
    pub record: &'a Record,
    pub row: usize,
    pub column_index: usize,
    pub column: &'a Column,
}

/// Cell renderer.
///
/// Returns the cell text, or `None` to keep `cell.text` (the value's display
/// form, or whatever the renderer wrote into the handle).
pub type Renderer = Arc<dyn Fn(&CellArgs<'_>, &mut Cell) -> Option<String> + Send + Sync>;

/// Declarative column definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub text: String,
    pub data_index: Option<String>,
    /// Fixed width; `None` makes the column flexible.
    pub width: Option<f64>,
    pub min_width: Option<f64>,
    /// Grow factor of a flexible column.
    pub flex: Option<f64>,
    pub resizable: bool,
    pub sortable: bool,
    pub hidden: bool,
    pub header_align: Align,
    pub header_vertical_align: VerticalAlign,
    pub text_align: Align,
    pub text_vertical_align: VerticalAlign,
    /// Child columns; a column with children is a group.
    pub columns: Vec<ColumnConfig>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            data_index: None,
            width: None,
            min_width: None,
            flex: None,
            resizable: true,
            sortable: false,
            hidden: false,
            header_align: Align::default(),
            header_vertical_align: VerticalAlign::default(),
            text_align: Align::default(),
            text_vertical_align: VerticalAlign::default(),
            columns: Vec::new(),
        }
    }
}

/// Layout attributes assigned by the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColumnLayout {
    /// Inside the frozen region.
    pub pinned: bool,
    /// Sticky left offset of a pinned column.
    pub sticky_left: Option<f64>,
    /// Stacking order of a pinned column; earlier columns stack higher.
    pub z_index: Option<usize>,
    /// Last pinned column (or header) at its level.
    pub end: bool,
    /// Cached [`Column::flex_grow`].
    pub flex_grow: f64,
    /// Cached [`Column::flex_basis`].
    pub flex_basis: f64,
}

/// A column or column group.
///
/// Leaves display one record field. Groups only carry a header; their
/// sizing is the aggregate of their visible children.
#[derive(Clone)]
pub struct Column {
    pub text: String,
    pub data_index: Option<String>,
    pub width: Option<f64>,
    pub min_width: Option<f64>,
    pub flex: f64,
    pub resizable: bool,
    pub sortable: bool,
    pub hidden: bool,
    pub header_align: Align,
    pub header_vertical_align: VerticalAlign,
    pub text_align: Align,
    pub text_vertical_align: VerticalAlign,
    pub(crate) children: Vec<Column>,
    pub(crate) renderer: Option<Renderer>,
    pub(crate) layout: ColumnLayout,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("text", &self.text)
            .field("data_index", &self.data_index)
            .field("width", &self.width)
            .field("min_width", &self.min_width)
            .field("hidden", &self.hidden)
            .field("children", &self.children)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Column {
    /// Creates a flexible leaf column.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data_index: None,
            width: None,
            min_width: None,
            flex: 1.0,
            resizable: true,
            sortable: false,
            hidden: false,
            header_align: Align::Left,
            header_vertical_align: VerticalAlign::Middle,
            text_align: Align::Left,
            text_vertical_align: VerticalAlign::Middle,
            children: Vec::new(),
            renderer: None,
            layout: ColumnLayout::default(),
        }
    }

    /// Creates a column group.
    pub fn group(text: impl Into<String>, children: Vec<Column>) -> Self {
        let mut column = Self::new(text);
        column.children = children;
        column
    }

    /// Builds a column tree from its declarative form.
    pub fn from_config(config: ColumnConfig) -> Self {
        Self {
            text: config.text,
            data_index: config.data_index,
            width: config.width,
            min_width: config.min_width,
            flex: config.flex.unwrap_or(1.0),
            resizable: config.resizable,
            sortable: config.sortable,
            hidden: config.hidden,
            header_align: config.header_align,
            header_vertical_align: config.header_vertical_align,
            text_align: config.text_align,
            text_vertical_align: config.text_vertical_align,
            children: config.columns.into_iter().map(Column::from_config).collect(),
            renderer: None,
            layout: ColumnLayout::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    pub fn data_index(mut self, field: impl Into<String>) -> Self {
        self.data_index = Some(field.into());
        self
    }

    /// Set a fixed width for this column.
    pub fn fixed(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the grow factor of a flexible column.
    pub fn flex(mut self, grow: f64) -> Self {
        self.flex = grow;
        self
    }

    pub fn min(mut self, min_width: f64) -> Self {
        self.min_width = Some(min_width);
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Set the body text alignment.
    pub fn align(mut self, align: Align) -> Self {
        self.text_align = align;
        self
    }

    pub fn header_align(mut self, align: Align) -> Self {
        self.header_align = align;
        self
    }

    pub fn renderer(
        mut self,
        renderer: impl Fn(&CellArgs<'_>, &mut Cell) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    // -------------------------------------------------------------------------
    // Tree
    // -------------------------------------------------------------------------

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn children(&self) -> &[Column] {
        &self.children
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Leaf columns under this one, in display order (itself for a leaf).
    pub fn leaves(&self) -> Vec<&Column> {
        if self.is_group() {
            self.children.iter().flat_map(Column::leaves).collect()
        } else {
            vec![self]
        }
    }

    /// Number of visible leaves under this column.
    pub fn visible_leaf_count(&self) -> usize {
        self.leaves().into_iter().filter(|c| !c.is_hidden()).count()
    }

    /// Tree depth, 1 for a leaf.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Column::depth).max().unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Sizing
    // -------------------------------------------------------------------------

    /// A group is hidden only when every child is.
    pub fn is_hidden(&self) -> bool {
        if self.is_group() {
            self.children.iter().all(Column::is_hidden)
        } else {
            self.hidden
        }
    }

    /// Smallest width this column can take.
    ///
    /// A leaf uses `min_width`, falling back to `width`; a group sums its
    /// visible children.
    pub fn min_width(&self) -> f64 {
        if self.is_group() {
            self.children
                .iter()
                .filter(|c| !c.is_hidden())
                .map(Column::min_width)
                .sum()
        } else {
            self.min_width.or(self.width).unwrap_or(0.0)
        }
    }

    /// Grow factor; fixed-width and hidden leaves do not grow.
    pub fn flex_grow(&self) -> f64 {
        if self.is_group() {
            return self.children.iter().map(Column::flex_grow).sum();
        }
        if self.hidden || self.width.is_some() {
            0.0
        } else {
            self.flex.max(0.0)
        }
    }

    /// Starting width before free space is distributed. Hidden leaves take
    /// none.
    pub fn flex_basis(&self) -> f64 {
        if self.is_group() {
            return self.children.iter().map(Column::flex_basis).sum();
        }
        if self.hidden {
            0.0
        } else {
            self.width.unwrap_or_else(|| self.min_width())
        }
    }

    /// Refreshes the cached flex values of this column only.
    pub(crate) fn refresh_flex(&mut self) {
        self.layout.flex_grow = self.flex_grow();
        self.layout.flex_basis = self.flex_basis();
    }

    /// Refreshes cached flex values for the whole subtree.
    pub(crate) fn refresh_flex_tree(&mut self) {
        for child in &mut self.children {
            child.refresh_flex_tree();
        }
        self.refresh_flex();
    }

    // -------------------------------------------------------------------------
    // Cells
    // -------------------------------------------------------------------------

    /// Renders one body cell for `record`.
    pub fn render_cell(&self, record: &Record, row: usize, column_index: usize) -> Cell {
        static NULL: Value = Value::Null;
        let value = self
            .data_index
            .as_deref()
            .map(|field| record.value(field))
            .unwrap_or(&NULL);
        let mut cell = Cell {
            text: value.to_string(),
            align: self.text_align,
            vertical_align: self.text_vertical_align,
            ..Default::default()
        };
        if let Some(renderer) = &self.renderer {
            let args = CellArgs {
                value,
                record,
                row,
                column_index,
                column: self,
            };
            if let Some(text) = renderer(&args, &mut cell) {
                cell.text = text;
            }
        }
        cell
    }
}

impl From<ColumnConfig> for Column {
    fn from(config: ColumnConfig) -> Self {
        Column::from_config(config)
    }
}
