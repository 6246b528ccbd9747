//! Grid normalization: raw rows, keyed records and table sources all become
//! one canonical [`Grid`]

use crate::error::{GridbookError, Result};
use crate::parse::collapse_whitespace;
use crate::source::TableSource;
use crate::types::{CellValue, ColumnDescriptor, ExportOptions, SummaryRow};
use serde::Serialize;

/// A keyed record. Key order is preserved so columns can be derived from it.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Canonical row-major grid of cell values.
///
/// Rows are never padded: row 0 defines the column count and callers using
/// column descriptors get rectangular grids by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<CellValue>> {
        self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, taken from row 0
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

/// Records-mode input
#[derive(Debug, Clone, PartialEq)]
pub struct RecordsInput {
    pub records: Vec<Record>,
    pub columns: Vec<ColumnDescriptor>,
}

/// The three ways a sheet's grid can be supplied
pub enum GridSource<'a> {
    /// Rows of values, used as-is (row 0 is usually the header)
    Rows(Vec<Vec<CellValue>>),
    /// Records read through column descriptors
    Records(RecordsInput),
    /// A table resolved from an external source
    Table(&'a dyn TableSource),
}

impl<'a> GridSource<'a> {
    pub fn rows<R, V>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        GridSource::Rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    pub fn records(records: Vec<Record>, columns: Vec<ColumnDescriptor>) -> Self {
        GridSource::Records(RecordsInput { records, columns })
    }

    pub fn table(source: &'a dyn TableSource) -> Self {
        GridSource::Table(source)
    }

    fn kind(&self) -> &'static str {
        match self {
            GridSource::Rows(_) => "rows",
            GridSource::Records(_) => "records",
            GridSource::Table(_) => "table",
        }
    }
}

/// Normalize any supported source into a grid.
///
/// Row numbering and the summary row only apply to records.
pub fn normalize(source: GridSource<'_>, options: &ExportOptions) -> Result<Grid> {
    log::debug!("normalizing {} source", source.kind());
    match source {
        GridSource::Rows(rows) => grid_from_rows(rows),
        GridSource::Records(input) => grid_from_records(&input.records, &input.columns, options),
        GridSource::Table(table) => grid_from_table(table),
    }
}

/// Raw grid mode: must be non-empty with a non-empty first row
pub fn grid_from_rows(rows: Vec<Vec<CellValue>>) -> Result<Grid> {
    if rows.is_empty() {
        return Err(GridbookError::InvalidInput(
            "grid must contain at least one row".to_string(),
        ));
    }
    if rows[0].is_empty() {
        return Err(GridbookError::InvalidInput(
            "first row of the grid has no cells".to_string(),
        ));
    }

    let rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(CellValue::coerce).collect())
        .collect();
    Ok(Grid { rows })
}

/// Raw grid mode from JSON: the value must be an array of arrays
pub fn grid_from_json(value: &serde_json::Value) -> Result<Grid> {
    let outer = value.as_array().ok_or_else(|| {
        GridbookError::InvalidInput("grid must be an array of rows".to_string())
    })?;

    let rows = outer
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            row.as_array()
                .map(|cells| cells.iter().map(CellValue::from_json).collect())
                .ok_or_else(|| {
                    GridbookError::InvalidInput(format!("row {} is not an array", idx))
                })
        })
        .collect::<Result<Vec<Vec<CellValue>>>>()?;

    grid_from_rows(rows)
}

/// Records mode: header from descriptor titles, one row per record, optional
/// row numbers and trailing summary row
pub fn grid_from_records(
    records: &[Record],
    columns: &[ColumnDescriptor],
    options: &ExportOptions,
) -> Result<Grid> {
    if columns.is_empty() {
        return Err(GridbookError::InvalidInput(
            "records export needs at least one column".to_string(),
        ));
    }

    let numbered = options.export_with_row_numbers;
    let width = columns.len() + usize::from(numbered);
    let mut rows = Vec::with_capacity(records.len() + 2);

    let mut header = Vec::with_capacity(width);
    if numbered {
        header.push(CellValue::from(options.row_number_text.as_str()));
    }
    header.extend(columns.iter().map(|c| CellValue::from(c.header_text())));
    rows.push(header);

    for (idx, record) in records.iter().enumerate() {
        let mut row = Vec::with_capacity(width);
        if numbered {
            row.push(CellValue::from(idx + 1));
        }
        row.extend(columns.iter().map(|c| {
            record
                .get(&c.key)
                .map(CellValue::from_json)
                .unwrap_or_else(CellValue::empty)
        }));
        rows.push(row);
    }

    if let Some(summary) = &options.summary {
        rows.push(summary_row(summary, numbered));
    }

    Ok(Grid { rows })
}

/// Without row numbers there is no column for the label, so it is dropped
/// and the values line up under the data columns.
fn summary_row(summary: &SummaryRow, numbered: bool) -> Vec<CellValue> {
    let mut row = Vec::with_capacity(summary.values.len() + 1);
    if numbered {
        row.push(CellValue::from(summary.label.as_str()));
    }
    row.extend(summary.values.iter().cloned().map(CellValue::coerce));
    row
}

/// Table mode: text per cell, whitespace runs collapsed and trimmed
pub fn grid_from_table(source: &dyn TableSource) -> Result<Grid> {
    let table = source.resolve_table()?.ok_or_else(|| {
        GridbookError::InvalidSource("source did not resolve to a table".to_string())
    })?;

    let rows: Vec<Vec<CellValue>> = table
        .iter()
        .map(|row| {
            row.iter()
                .map(|text| CellValue::String(collapse_whitespace(text)))
                .collect()
        })
        .collect();

    if rows.is_empty() {
        return Err(GridbookError::InvalidInput("table has no rows".to_string()));
    }
    grid_from_rows(rows)
}

/// Convert serializable values into records; every value must serialize to
/// a JSON object
pub fn records_from_serialize<T: Serialize>(items: &[T]) -> Result<Vec<Record>> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| match serde_json::to_value(item)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(GridbookError::InvalidInput(format!(
                "record {} is not an object: {}",
                idx, other
            ))),
        })
        .collect()
}

/// Column descriptors taken from the keys of the first record, in order
pub fn columns_from_records(records: &[Record]) -> Vec<ColumnDescriptor> {
    records
        .first()
        .map(|first| first.keys().map(ColumnDescriptor::new).collect())
        .unwrap_or_default()
}
