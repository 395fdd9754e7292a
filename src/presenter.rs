//! List presenter.
//! Renders the notification list as a text table plus the global flags, and
//! remembers which row is selected. Everything else is read from the document
//! on each render.

use crate::error::{EditorError, Result};
use crate::model::{Configuration, Flag, Notification};

pub const COLUMNS: [&str; 7] = ["Hour", "Minute", "Second", "Title", "Text", "Icon", "Color"];

/// Cells wider than this are cut and end in `~`.
const MAX_CELL_WIDTH: usize = 28;

#[derive(Debug, Default)]
pub struct ListPresenter {
    selected: Option<usize>,
}

impl ListPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, config: &Configuration, index: usize) -> Result<()> {
        let len = config.notifications.len();
        if index >= len {
            return Err(EditorError::Index { index, len });
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Selects the final row, or nothing when the list is empty.
    pub fn select_last(&mut self, config: &Configuration) {
        self.selected = config.notifications.len().checked_sub(1);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Keeps the selection on a valid row after the list shrank.
    pub fn after_delete(&mut self, len: usize) {
        self.selected = match self.selected {
            _ if len == 0 => None,
            Some(index) if index >= len => Some(len - 1),
            other => other,
        };
    }

    /// One short line per notification, for pick lists.
    pub fn row_labels(&self, config: &Configuration) -> Vec<String> {
        config
            .notifications
            .iter()
            .map(|n| {
                format!(
                    "{:02}:{:02}:{:02}  {}",
                    n.hour,
                    n.minute,
                    n.second,
                    clip(&one_line(&n.title))
                )
            })
            .collect()
    }

    /// Flag checkboxes followed by the version.
    pub fn render_flags(&self, config: &Configuration) -> String {
        let mut parts: Vec<String> = Flag::ALL
            .iter()
            .map(|flag| {
                let mark = if flag.get(config) { 'x' } else { ' ' };
                format!("[{}] {}", mark, flag.label())
            })
            .collect();
        parts.push(format!("Version: {}", config.version));
        parts.join("   ")
    }

    /// The full screen: flags, a header row and one row per notification.
    pub fn render(&self, config: &Configuration) -> String {
        let rows: Vec<[String; 7]> = config.notifications.iter().map(cells).collect();

        let mut widths = COLUMNS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&self.render_flags(config));
        out.push_str("\n\n");
        out.push_str(&format_row("  ", &COLUMNS.map(String::from), &widths));
        for (index, row) in rows.iter().enumerate() {
            let marker = if self.selected == Some(index) { "> " } else { "  " };
            out.push_str(&format_row(marker, row, &widths));
        }
        if rows.is_empty() {
            out.push_str("  (no notifications)\n");
        }
        out
    }
}

fn cells(n: &Notification) -> [String; 7] {
    [
        n.hour.to_string(),
        n.minute.to_string(),
        n.second.to_string(),
        clip(&one_line(&n.title)),
        clip(&one_line(&n.text)),
        clip(&one_line(&n.icon)),
        clip(&one_line(&n.color)),
    ]
}

fn format_row(marker: &str, cells: &[String; 7], widths: &[usize; 7]) -> String {
    let mut line = String::from(marker);
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str(cell);
        let pad = width.saturating_sub(cell.chars().count());
        line.extend(std::iter::repeat_n(' ', pad + 2));
    }
    let mut line = line.trim_end().to_string();
    line.push('\n');
    line
}

fn one_line(value: &str) -> String {
    value.lines().map(str::trim).collect::<Vec<_>>().join(" / ")
}

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
    clipped.push('~');
    clipped
}
