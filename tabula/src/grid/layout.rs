//! Column layout: freeze, flex distribution and tree addressing.

use super::Column;

/// Outcome of a freeze pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FreezeLayout {
    /// Number of pinned top-level headers.
    pub freeze: usize,
    /// Number of pinned visible leaf columns.
    pub freeze_column: usize,
    /// Sum of the pinned leaves' minimum widths.
    pub freeze_width: f64,
}

/// Leaf columns of a header list, in display order.
pub(crate) fn leaves(headers: &[Column]) -> Vec<&Column> {
    headers.iter().flat_map(Column::leaves).collect()
}

/// Pins the first `freeze` top-level headers.
///
/// Every visible node inside them gets a sticky left offset (the running
/// sum of the pinned leaves' minimum widths before it) and a z-index that
/// decreases left to right. The last pinned leaf, and each group ending at
/// it, is marked `end`.
pub(crate) fn apply_freeze(headers: &mut [Column], freeze: usize) -> FreezeLayout {
    let freeze = freeze.min(headers.len());
    let freeze_column: usize = headers[..freeze]
        .iter()
        .map(Column::visible_leaf_count)
        .sum();

    for header in headers.iter_mut() {
        unpin(header);
    }

    let mut offset = 0.0;
    let mut pinned = 0;
    for header in headers.iter_mut().take(freeze) {
        pin(header, &mut offset, &mut pinned, freeze_column);
    }

    log::trace!(
        "freeze {} headers: {} columns, {}px",
        freeze,
        freeze_column,
        offset
    );
    FreezeLayout {
        freeze,
        freeze_column,
        freeze_width: offset,
    }
}

fn unpin(column: &mut Column) {
    column.layout.pinned = false;
    column.layout.sticky_left = None;
    column.layout.z_index = None;
    column.layout.end = false;
    for child in &mut column.children {
        unpin(child);
    }
}

fn pin(column: &mut Column, offset: &mut f64, pinned: &mut usize, total: usize) {
    if column.is_hidden() {
        return;
    }
    column.layout.pinned = true;
    column.layout.sticky_left = Some(*offset);
    column.layout.z_index = Some(total - *pinned);

    if column.is_group() {
        for child in &mut column.children {
            pin(child, offset, pinned, total);
        }
    } else {
        *offset += column.min_width();
        *pinned += 1;
    }
    column.layout.end = *pinned == total;
}

/// Actual widths of all leaves for an available width.
///
/// Each visible leaf starts at its flex basis; space left over is shared by
/// grow factor. Hidden leaves get zero.
pub(crate) fn leaf_widths(headers: &[Column], available: f64) -> Vec<f64> {
    let leaves = leaves(headers);
    let basis: f64 = leaves.iter().map(|c| c.flex_basis()).sum();
    let grow: f64 = leaves.iter().map(|c| c.flex_grow()).sum();
    let extra = (available - basis).max(0.0);

    leaves
        .iter()
        .map(|c| {
            if c.is_hidden() {
                0.0
            } else if grow > 0.0 {
                c.flex_basis() + extra * c.flex_grow() / grow
            } else {
                c.flex_basis()
            }
        })
        .collect()
}

/// Child-index path from the header list to leaf number `leaf`.
pub(crate) fn leaf_path(headers: &[Column], leaf: usize) -> Option<Vec<usize>> {
    fn walk(columns: &[Column], target: usize, seen: &mut usize, path: &mut Vec<usize>) -> bool {
        for (i, column) in columns.iter().enumerate() {
            path.push(i);
            if column.is_group() {
                if walk(&column.children, target, seen, path) {
                    return true;
                }
            } else if *seen == target {
                return true;
            } else {
                *seen += 1;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    let mut seen = 0;
    walk(headers, leaf, &mut seen, &mut path).then_some(path)
}

pub(crate) fn node<'a>(headers: &'a [Column], path: &[usize]) -> Option<&'a Column> {
    let (first, rest) = path.split_first()?;
    let mut node = headers.get(*first)?;
    for i in rest {
        node = node.children.get(*i)?;
    }
    Some(node)
}

pub(crate) fn node_mut<'a>(headers: &'a mut [Column], path: &[usize]) -> Option<&'a mut Column> {
    let (first, rest) = path.split_first()?;
    let mut node = headers.get_mut(*first)?;
    for i in rest {
        node = node.children.get_mut(*i)?;
    }
    Some(node)
}

/// Refreshes cached flex values along `path`, deepest node first.
pub(crate) fn refresh_path(headers: &mut [Column], path: &[usize]) {
    for depth in (1..=path.len()).rev() {
        if let Some(node) = node_mut(headers, &path[..depth]) {
            node.refresh_flex();
        }
    }
}
