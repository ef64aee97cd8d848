//! Table detection: line clusters + column assignment → [`TableData`].
//!
//! The lines of one page form one table. The header is chosen by
//! [`HeaderPolicy`]; every other line becomes a row, including rows whose
//! cells are all empty (statements use them as spacers).

use crate::output::{TableData, TableRow};
use crate::pipeline::columns::ColumnAssigner;
use crate::pipeline::fields::is_money_cell;
use crate::pipeline::lines::LineCluster;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How a table's header row is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPolicy {
    /// Use the first line when it reads like a header (some text, no money
    /// values); otherwise name the columns `Column 1 … Column N` and keep
    /// the first line as data.
    #[default]
    Auto,
    /// Always use the first line.
    FirstLine,
    /// Caller-supplied names, padded with `Column k` up to the column count.
    /// Every line is data.
    Fixed(Vec<String>),
}

/// Build the table for one run of lines.
///
/// Returns `None` when there are no lines. Every row has exactly
/// `columns.column_count()` cells.
pub fn detect_table<C>(
    lines: &[LineCluster],
    columns: &C,
    policy: &HeaderPolicy,
    page: Option<usize>,
) -> Option<TableData>
where
    C: ColumnAssigner + ?Sized,
{
    if lines.is_empty() {
        return None;
    }

    let mut rows: Vec<TableRow> = lines.iter().map(|line| columns.partition(line)).collect();
    let n = columns.column_count();

    let headers = match policy {
        HeaderPolicy::FirstLine => rows.remove(0),
        HeaderPolicy::Auto if looks_like_header(&rows[0]) => rows.remove(0),
        HeaderPolicy::Auto => synthetic_headers(n),
        HeaderPolicy::Fixed(names) => pad_headers(names, n),
    };

    Some(TableData {
        headers,
        rows,
        page,
    })
}

/// Build one table from several pages' lines.
///
/// The header comes from the first non-empty page. A later page whose first
/// line repeats that header (reprinted column titles) has the line dropped.
pub fn detect_merged_table<'a, C>(
    pages: impl IntoIterator<Item = &'a [LineCluster]>,
    columns: &C,
    policy: &HeaderPolicy,
) -> Option<TableData>
where
    C: ColumnAssigner + ?Sized,
{
    detect_merged_table_with(pages, columns, policy, |_, _| {})
}

/// [`detect_merged_table`], calling `on_page(index, rows_appended)` once
/// per input page, empty pages included.
pub fn detect_merged_table_with<'a, C>(
    pages: impl IntoIterator<Item = &'a [LineCluster]>,
    columns: &C,
    policy: &HeaderPolicy,
    mut on_page: impl FnMut(usize, usize),
) -> Option<TableData>
where
    C: ColumnAssigner + ?Sized,
{
    let mut merged: Option<TableData> = None;

    for (i, lines) in pages.into_iter().enumerate() {
        let appended = match merged.as_mut() {
            Some(table) => {
                let before = table.rows.len();
                let mut rows = lines.iter().map(|line| columns.partition(line)).peekable();
                if rows.next_if(|row| *row == table.headers).is_some() {
                    debug!(page_index = i, "dropped repeated header row");
                }
                table.rows.extend(rows);
                table.rows.len() - before
            }
            None => {
                merged = detect_table(lines, columns, policy, None);
                merged.as_ref().map_or(0, |table| table.rows.len())
            }
        };
        on_page(i, appended);
    }
    merged
}

fn looks_like_header(row: &[String]) -> bool {
    row.iter().any(|cell| !cell.is_empty()) && !row.iter().any(|cell| is_money_cell(cell))
}

fn synthetic_headers(n: usize) -> Vec<String> {
    (1..=n).map(|k| format!("Column {k}")).collect()
}

fn pad_headers(names: &[String], n: usize) -> Vec<String> {
    if names.len() > n {
        warn!(
            given = names.len(),
            columns = n,
            "more header names than columns, extra names dropped"
        );
    }
    let mut headers: Vec<String> = names.iter().take(n).cloned().collect();
    for k in headers.len() + 1..=n {
        headers.push(format!("Column {k}"));
    }
    headers
}
