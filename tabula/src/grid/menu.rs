//! Context menu model.

use crate::items::Items;

/// One entry of a context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub text: String,
    pub disabled: bool,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// A context menu, populated by `open_menu` listeners.
///
/// Shown anchored at the pointer if any listener added an item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Menu {
    pub items: Items<MenuItem>,
    anchor: Option<(f64, f64)>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item; see [`Items::insert`] for `position`.
    pub fn add(&mut self, item: MenuItem, position: Option<isize>) -> usize {
        self.items.insert(item, position)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Where the menu is shown, if it is.
    pub fn anchor(&self) -> Option<(f64, f64)> {
        self.anchor
    }

    pub(crate) fn show_at(&mut self, x: f64, y: f64) {
        self.anchor = Some((x, y));
    }
}
