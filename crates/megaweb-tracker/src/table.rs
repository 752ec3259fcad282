/*
[INPUT]:  Task status records from poll loops
[OUTPUT]: One row per task handle, newest first, plus a text rendering
[POS]:    Presentation state shared between poll loops and the CLI
[UPDATE]: When adding columns or changing row identity
*/

use chrono::{DateTime, Utc};
use console::style;
use megaweb_adapter::{TaskHandle, TaskStatus, TaskStatusRecord};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use unicode_width::UnicodeWidthStr;

/// Table shared by every poll loop of a tracker
pub type SharedTable = Arc<Mutex<TaskTable>>;

const RESULT_COLUMN_MAX: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub handle: TaskHandle,
    pub status: TaskStatus,
    pub result: Option<String>,
    /// Status responses rendered into this row
    pub polls: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowChange {
    Inserted,
    StatusChanged { from: TaskStatus },
    Refreshed,
}

/// Rows keyed by task handle; a handle never owns more than one row.
#[derive(Debug)]
pub struct TaskTable {
    rows: VecDeque<TaskRow>,
    revision: watch::Sender<u64>,
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskTable {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            rows: VecDeque::new(),
            revision,
        }
    }

    pub fn shared() -> SharedTable {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Render a status record into the row of `handle`.
    ///
    /// The first record of a handle inserts a row at the top; later records
    /// overwrite that row in place.
    pub fn upsert(&mut self, handle: &TaskHandle, record: &TaskStatusRecord) -> RowChange {
        let now = Utc::now();
        let change = match self.rows.iter_mut().find(|row| &row.handle == handle) {
            Some(row) => {
                let change = if row.status == record.task_status {
                    RowChange::Refreshed
                } else {
                    RowChange::StatusChanged {
                        from: row.status.clone(),
                    }
                };
                row.status = record.task_status.clone();
                row.result = record.task_result.clone();
                row.polls += 1;
                row.updated_at = now;
                change
            }
            None => {
                self.rows.push_front(TaskRow {
                    handle: handle.clone(),
                    status: record.task_status.clone(),
                    result: record.task_result.clone(),
                    polls: 1,
                    updated_at: now,
                });
                RowChange::Inserted
            }
        };

        self.revision.send_modify(|revision| *revision += 1);
        change
    }

    pub fn get(&self, handle: &TaskHandle) -> Option<&TaskRow> {
        self.rows.iter().find(|row| &row.handle == handle)
    }

    /// Rows, most recently inserted first
    pub fn rows(&self) -> impl Iterator<Item = &TaskRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Receiver bumped on every upsert
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Text table with aligned columns. `styled` colors the status column.
    pub fn render(&self, styled: bool) -> String {
        let header = ["TASK ID", "STATUS", "RESULT", "POLLS", "UPDATED"];
        let cells: Vec<[String; 5]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.handle.to_string(),
                    row.status.to_string(),
                    truncate(row.result.as_deref().unwrap_or("-"), RESULT_COLUMN_MAX),
                    row.polls.to_string(),
                    row.updated_at.format("%H:%M:%S").to_string(),
                ]
            })
            .collect();

        let mut widths = header.map(|title| title.width());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.width());
            }
        }

        let mut out = String::new();
        let header_cells = header.map(str::to_string);
        out.push_str(&format_line(&header_cells, &widths, |_, cell| cell));
        for (row, cell_row) in self.rows.iter().zip(cells.iter()) {
            out.push_str(&format_line(cell_row, &widths, |column, cell| {
                if styled && column == 1 {
                    paint_status(&row.status, cell)
                } else {
                    cell
                }
            }));
        }
        out
    }
}

fn format_line<F>(cells: &[String; 5], widths: &[usize; 5], paint: F) -> String
where
    F: Fn(usize, String) -> String,
{
    let mut line = String::new();
    for (column, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
        let pad = width.saturating_sub(cell.width());
        let padded = format!("{cell}{}", " ".repeat(pad));
        line.push_str(&paint(column, padded));
        if column + 1 < cells.len() {
            line.push_str("  ");
        }
    }
    line.truncate(line.trim_end().len());
    line.push('\n');
    line
}

fn paint_status(status: &TaskStatus, cell: String) -> String {
    match status {
        TaskStatus::Success => style(cell).green().to_string(),
        TaskStatus::Failure => style(cell).red().to_string(),
        _ => style(cell).yellow().to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace(['\r', '\n'], " ");
    if single_line.width() <= max {
        return single_line;
    }
    let mut out = String::new();
    for ch in single_line.chars() {
        if out.width() + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}
