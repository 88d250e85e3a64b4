//! Plain-text rendering of the render models.

use tabula::grid::{Align, GridView, HeaderCell};
use tabula::pagination::PaginationView;
use tabula::tabula_lib::model::Direction;

/// Pixels per character cell.
const CHAR_WIDTH: f64 = 8.0;

fn chars(px: f64) -> usize {
    ((px / CHAR_WIDTH).round() as usize).max(1)
}

fn fit(text: &str, width: usize, align: Align) -> String {
    let text: String = text.chars().take(width).collect();
    match align {
        Align::Left => format!("{:<width$}", text),
        Align::Center => format!("{:^width$}", text),
        Align::Right => format!("{:>width$}", text),
    }
}

fn header_text(cell: &HeaderCell) -> String {
    match cell.sort {
        Some(Direction::Asc) => format!("{} ^", cell.text),
        Some(Direction::Desc) => format!("{} v", cell.text),
        None => cell.text.clone(),
    }
}

pub fn grid(view: &GridView) -> String {
    let mut out = String::new();
    if view.hidden {
        return out;
    }

    for row in &view.header {
        let mut line = String::new();
        let mut cursor = 0;
        for cell in row {
            let start = chars(cell.left);
            if start > cursor {
                line.push_str(&" ".repeat(start - cursor));
            }
            let width = chars(cell.width);
            line.push('|');
            line.push_str(&fit(&header_text(cell), width.saturating_sub(1), cell.align));
            cursor = start.max(cursor) + width;
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    for row in &view.rows {
        let marker = match (row.selected, row.focused) {
            (true, _) => '*',
            (false, true) => '>',
            _ => ' ',
        };
        let mut line = String::new();
        for body in &row.cells {
            let width = chars(body.width);
            line.push(if body.focused { '[' } else { '|' });
            line.push_str(&fit(&body.cell.text, width.saturating_sub(1), body.cell.align));
        }
        out.push(marker);
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if view.loading {
        out.push_str("  loading...\n");
    }
    if let Some(menu) = &view.menu {
        let labels: Vec<&str> = menu.items.iter().map(|i| i.text.as_str()).collect();
        out.push_str(&format!("  menu: {}\n", labels.join(", ")));
    }
    out
}

pub fn pagination(view: &PaginationView) -> String {
    if view.hidden {
        return String::new();
    }
    let items: Vec<String> = view
        .items
        .iter()
        .map(|t| {
            if t.disabled && !t.text.is_empty() {
                format!("({})", t.text)
            } else {
                t.text.clone()
            }
        })
        .filter(|t| !t.is_empty())
        .collect();
    format!("{}\n", items.join(" "))
}
