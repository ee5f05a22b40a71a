//! HTML tables to ordered row records
//!
//! Each table is parsed on its own; a table that cannot be parsed is logged
//! and skipped without affecting its siblings.

use crate::extract::text::collapse_text;
use crate::extract::types::{ExtractedTable, TableKind, TableRow};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Number, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Upper bound on colspan/rowspan values taken from markup
const MAX_SPAN: usize = 1_000;

lazy_static! {
    static ref TABLE_SELECTOR: Selector = Selector::parse("table").unwrap();
    static ref ROW_SELECTOR: Selector = Selector::parse("tr").unwrap();
    static ref PLAIN_NUMBER: Regex = Regex::new(r"^[-+]?[0-9]+(\.[0-9]+)?$").unwrap();
    static ref GROUPED_NUMBER: Regex =
        Regex::new(r"^[-+]?[0-9]{1,3}(,[0-9]{3})+(\.[0-9]+)?$").unwrap();
}

/// Why a single table could not be turned into rows
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("table has no rows")]
    NoRows,

    #[error("row {row} has {cells} cells but the header defines {columns} columns")]
    Irregular {
        row: usize,
        cells: usize,
        columns: usize,
    },
}

/// Extracts every parseable table on the page, in document order
///
/// Title is the table's own caption, or `Table N` with N the 1-based
/// position among all tables on the page (nested tables included).
pub fn extract_tables(document: &Html, extracted_at: DateTime<Utc>) -> Vec<ExtractedTable> {
    let mut tables = Vec::new();

    for (idx, table) in document.select(&TABLE_SELECTOR).enumerate() {
        let position = idx + 1;
        match parse_table(&table) {
            Ok(rows) => tables.push(ExtractedTable {
                title: table_title(&table, position),
                kind: TableKind::Table,
                rows,
                extracted_at,
            }),
            Err(e) => {
                tracing::warn!("Could not parse table {}: {}", position, e);
            }
        }
    }

    tables
}

fn table_title(table: &ElementRef<'_>, position: usize) -> String {
    table
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "caption")
        .map(|caption| collapse_text(&caption))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| format!("Table {}", position))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Head,
    Body,
    Foot,
}

#[derive(Debug, Clone)]
struct RawCell {
    text: String,
    is_header: bool,
    colspan: usize,
    rowspan: usize,
}

#[derive(Debug)]
struct RawRow {
    section: Section,
    cells: Vec<RawCell>,
}

#[derive(Debug, Clone)]
struct GridCell {
    text: String,
    is_header: bool,
}

#[derive(Debug)]
struct GridRow {
    section: Section,
    cells: Vec<Option<GridCell>>,
}

impl GridRow {
    fn is_all_header(&self) -> bool {
        !self.cells.is_empty()
            && self
                .cells
                .iter()
                .all(|cell| cell.as_ref().is_some_and(|c| c.is_header))
    }
}

/// Parses one table element into ordered row records
///
/// # Parsing Rules
///
/// - Rows of nested tables belong to those tables, not this one
/// - `colspan`/`rowspan` copy the cell into every covered position
/// - Header: rows in `thead`, otherwise leading rows made only of `th`;
///   multi-row headers join their texts per column
/// - Column names: blank → `Unnamed: i`, repeats → `name.1`, `name.2`;
///   positional `0..n` when the table has no header
/// - Footer rows follow body rows
/// - Empty cells become null, numeric cells become numbers, short rows are
///   padded with null
pub fn parse_table(table: &ElementRef<'_>) -> Result<Vec<TableRow>, TableError> {
    let raw_rows = own_rows(table);
    let grid = expand_spans(&raw_rows);

    let mut header_rows: Vec<&GridRow> = grid
        .iter()
        .filter(|r| r.section == Section::Head)
        .collect();
    let mut body_rows: Vec<&GridRow> = grid
        .iter()
        .filter(|r| r.section == Section::Body)
        .chain(grid.iter().filter(|r| r.section == Section::Foot))
        .collect();

    if header_rows.is_empty() {
        while body_rows.first().is_some_and(|row| row.is_all_header()) {
            header_rows.push(body_rows.remove(0));
        }
    }

    if header_rows.is_empty() && body_rows.is_empty() {
        return Err(TableError::NoRows);
    }

    let columns = if header_rows.is_empty() {
        let width = body_rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        (0..width).map(|i| i.to_string()).collect::<Vec<_>>()
    } else {
        header_names(&header_rows)
    };

    if columns.is_empty() {
        return Err(TableError::NoRows);
    }

    let mut records = Vec::with_capacity(body_rows.len());
    for (idx, row) in body_rows.iter().enumerate() {
        if row.cells.len() > columns.len() {
            return Err(TableError::Irregular {
                row: idx + 1,
                cells: row.cells.len(),
                columns: columns.len(),
            });
        }

        let mut record = TableRow::new();
        for (col, name) in columns.iter().enumerate() {
            let value = row
                .cells
                .get(col)
                .and_then(|cell| cell.as_ref())
                .map(|cell| cell_value(&cell.text))
                .unwrap_or(Value::Null);
            record.insert(name.clone(), value);
        }
        records.push(record);
    }

    Ok(records)
}

/// Collects the rows that belong to `table` itself, skipping empty rows
fn own_rows(table: &ElementRef<'_>) -> Vec<RawRow> {
    let table_id = table.id();
    let mut rows = Vec::new();

    for tr in table.select(&ROW_SELECTOR) {
        let owner = tr
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "table")
            .map(|el| el.id());
        if owner != Some(table_id) {
            continue;
        }

        let section = tr
            .parent()
            .and_then(ElementRef::wrap)
            .map(|parent| match parent.value().name() {
                "thead" => Section::Head,
                "tfoot" => Section::Foot,
                _ => Section::Body,
            })
            .unwrap_or(Section::Body);

        let cells: Vec<RawCell> = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| matches!(cell.value().name(), "td" | "th"))
            .map(|cell| RawCell {
                text: collapse_text(&cell),
                is_header: cell.value().name() == "th",
                colspan: span_attr(&cell, "colspan"),
                rowspan: span_attr(&cell, "rowspan"),
            })
            .collect();

        if !cells.is_empty() {
            rows.push(RawRow { section, cells });
        }
    }

    rows
}

fn span_attr(cell: &ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

/// Lays raw rows out on a rectangular-ish grid, honouring spans
fn expand_spans(rows: &[RawRow]) -> Vec<GridRow> {
    // Per column: remaining rows a rowspan still covers, and the value to copy
    let mut pending: Vec<Option<(usize, GridCell)>> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut out: Vec<Option<GridCell>> = Vec::new();

        for cell in &row.cells {
            fill_pending(&mut pending, &mut out, false);

            let value = GridCell {
                text: cell.text.clone(),
                is_header: cell.is_header,
            };
            for _ in 0..cell.colspan {
                let col = out.len();
                if cell.rowspan > 1 {
                    if pending.len() <= col {
                        pending.resize(col + 1, None);
                    }
                    pending[col] = Some((cell.rowspan - 1, value.clone()));
                }
                out.push(Some(value.clone()));
            }
        }

        fill_pending(&mut pending, &mut out, true);

        grid.push(GridRow {
            section: row.section,
            cells: out,
        });
    }

    grid
}

/// Copies spanned values into `out` from its current end
///
/// With `to_end` the remaining columns up to the last active span are filled
/// too, leaving `None` in gaps.
fn fill_pending(
    pending: &mut [Option<(usize, GridCell)>],
    out: &mut Vec<Option<GridCell>>,
    to_end: bool,
) {
    loop {
        let col = out.len();
        if col >= pending.len() {
            return;
        }

        if let Some((remaining, cell)) = pending[col].as_mut() {
            out.push(Some(cell.clone()));
            *remaining -= 1;
            if *remaining == 0 {
                pending[col] = None;
            }
            continue;
        }

        let later_active = pending[col + 1..].iter().any(Option::is_some);
        if to_end && later_active {
            out.push(None);
        } else {
            return;
        }
    }
}

fn header_names(header_rows: &[&GridRow]) -> Vec<String> {
    let width = header_rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    let mut names = Vec::with_capacity(width);

    for col in 0..width {
        let mut parts: Vec<&str> = Vec::new();
        for row in header_rows {
            if let Some(Some(cell)) = row.cells.get(col) {
                let text = cell.text.as_str();
                if !text.is_empty() && parts.last() != Some(&text) {
                    parts.push(text);
                }
            }
        }
        names.push(parts.join(" "));
    }

    dedupe_column_names(names)
}

/// Fills blank names and disambiguates repeats
fn dedupe_column_names(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(names.len());

    for (idx, name) in names.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut counter = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, counter);
            counter += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

/// Converts cell text to a JSON value
///
/// Empty → null; integers and decimals (optionally with thousands
/// separators) → numbers; anything else → string.
pub fn cell_value(text: &str) -> Value {
    let text = text.trim();
    if text.is_empty() {
        return Value::Null;
    }

    let numeric = if PLAIN_NUMBER.is_match(text) {
        Some(text.to_string())
    } else if GROUPED_NUMBER.is_match(text) {
        Some(text.replace(',', ""))
    } else {
        None
    };

    if let Some(digits) = numeric {
        if !digits.contains('.') {
            if let Ok(n) = digits.parse::<i64>() {
                return Value::from(n);
            }
        }
        if let Some(n) = digits.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }

    Value::String(text.to_string())
}
