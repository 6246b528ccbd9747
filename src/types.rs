//! Type definitions for gridbook

use crate::parse::encode_cell_ref;
use crate::style::{CellStyle, StyleSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Maximum sheet name length accepted by the xlsx format
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Excel worksheet maximum row count
pub const MAX_ROWS: u32 = 1_048_576;

/// Excel worksheet maximum column count
pub const MAX_COLUMNS: u16 = 16_384;

/// Default header of the row-number column in records mode
pub const DEFAULT_ROW_NUMBER_TEXT: &str = "N°";

/// Characters the xlsx format rejects in sheet names
pub(crate) const ILLEGAL_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// A spreadsheet-primitive cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl CellValue {
    /// Empty text cell
    pub fn empty() -> Self {
        CellValue::String(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::String(s) if s.is_empty())
    }

    /// Coerce into a value the encoder can write. NaN and infinities have no
    /// spreadsheet representation and become empty text.
    pub(crate) fn coerce(self) -> Self {
        match self {
            CellValue::Number(n) if !n.is_finite() => CellValue::empty(),
            other => other,
        }
    }

    /// Convert a JSON value: null -> "", bool/number/string pass through,
    /// arrays and objects become their compact JSON text
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => CellValue::empty(),
            Value::Bool(b) => CellValue::Boolean(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => CellValue::Number(f).coerce(),
                None => CellValue::String(n.to_string()),
            },
            Value::String(s) => CellValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => CellValue::String(value.to_string()),
        }
    }

    /// Text shown for the value, used for width measurement
    pub fn display_text(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Boolean(b) => b.to_string(),
        }
    }

    /// Length of the displayed text in characters
    pub fn text_len(&self) -> usize {
        match self {
            CellValue::String(s) => s.chars().count(),
            other => other.display_text().chars().count(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<usize> for CellValue {
    fn from(n: usize) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        CellValue::from_json(value)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(CellValue::from_json(&value))
    }
}

/// A cell of a built sheet: value plus resolved style
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: Option<CellStyle>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self { value, style: None }
    }
}

/// Rectangular cell range, all indices 0-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl CellRange {
    pub fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }
}

impl fmt::Display for CellRange {
    /// A1 notation; a single-cell range collapses to one address
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = encode_cell_ref(self.first_row, self.first_col);
        if self.first_row == self.last_row && self.first_col == self.last_col {
            return f.write_str(&start);
        }
        write!(
            f,
            "{}:{}",
            start,
            encode_cell_ref(self.last_row, self.last_col)
        )
    }
}

/// Column of a records export: which field to read and how to title it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnDescriptor {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: None,
            name: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Header text: title, then name, then key
    pub fn header_text(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.key)
    }
}

/// Trailing aggregate row of a records export
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    #[serde(default)]
    pub values: Vec<CellValue>,
}

impl SummaryRow {
    pub fn new(label: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

/// Export options with every default filled in
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// Compute column widths from content
    pub auto_fit: bool,
    /// Put an auto-filter on the header row
    pub enable_filters: bool,
    /// Style applied to every cell of row 0
    pub header_style: Option<StyleSpec>,
    /// Per-cell overrides keyed by A1 address, applied after the header style
    pub cell_styles: IndexMap<String, StyleSpec>,
    /// Prefix each record row with its 1-based index (records mode only)
    pub export_with_row_numbers: bool,
    /// Header of the row-number column
    pub row_number_text: String,
    /// Trailing aggregate row (records mode only)
    pub summary: Option<SummaryRow>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            auto_fit: true,
            enable_filters: true,
            header_style: None,
            cell_styles: IndexMap::new(),
            export_with_row_numbers: false,
            row_number_text: DEFAULT_ROW_NUMBER_TEXT.to_string(),
            summary: None,
        }
    }
}

/// Per-sheet overrides (all optional, defaults to the workbook settings)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetOptions {
    pub auto_fit: Option<bool>,
    pub enable_filters: Option<bool>,
    pub header_style: Option<StyleSpec>,
    pub cell_styles: Option<IndexMap<String, StyleSpec>>,
    pub export_with_row_numbers: Option<bool>,
    pub row_number_text: Option<String>,
    pub summary: Option<SummaryRow>,
}

impl SheetOptions {
    /// Fill unset fields from `defaults`
    pub fn resolve(&self, defaults: &ExportOptions) -> ExportOptions {
        ExportOptions {
            auto_fit: self.auto_fit.unwrap_or(defaults.auto_fit),
            enable_filters: self.enable_filters.unwrap_or(defaults.enable_filters),
            header_style: self
                .header_style
                .clone()
                .or_else(|| defaults.header_style.clone()),
            cell_styles: self
                .cell_styles
                .clone()
                .unwrap_or_else(|| defaults.cell_styles.clone()),
            export_with_row_numbers: self
                .export_with_row_numbers
                .unwrap_or(defaults.export_with_row_numbers),
            row_number_text: self
                .row_number_text
                .clone()
                .unwrap_or_else(|| defaults.row_number_text.clone()),
            summary: self.summary.clone().or_else(|| defaults.summary.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text() {
        assert_eq!(CellValue::from("Ana").display_text(), "Ana");
        assert_eq!(CellValue::from(30).display_text(), "30");
        assert_eq!(CellValue::from(2.5).display_text(), "2.5");
        assert_eq!(CellValue::from(true).display_text(), "true");
    }

    #[test]
    fn test_text_len_counts_chars() {
        assert_eq!(CellValue::from("N°").text_len(), 2);
        assert_eq!(CellValue::from("ñandú").text_len(), 5);
    }

    #[test]
    fn test_from_json() {
        use serde_json::json;
        assert_eq!(CellValue::from_json(&json!(null)), CellValue::empty());
        assert_eq!(CellValue::from_json(&json!(3)), CellValue::Number(3.0));
        assert_eq!(CellValue::from_json(&json!(false)), CellValue::Boolean(false));
        assert_eq!(
            CellValue::from_json(&json!([1, 2])),
            CellValue::String("[1,2]".to_string())
        );
    }

    #[test]
    fn test_coerce_non_finite() {
        assert!(CellValue::Number(f64::NAN).coerce().is_empty());
        assert!(CellValue::Number(f64::INFINITY).coerce().is_empty());
        assert_eq!(CellValue::Number(1.0).coerce(), CellValue::Number(1.0));
    }

    #[test]
    fn test_range_display() {
        assert_eq!(CellRange::new(0, 0, 2, 1).to_string(), "A1:B3");
        assert_eq!(CellRange::new(0, 0, 0, 0).to_string(), "A1");
        assert_eq!(CellRange::new(0, 0, 0, 27).to_string(), "A1:AB1");
    }

    #[test]
    fn test_header_text_fallback() {
        let mut col = ColumnDescriptor::new("age");
        assert_eq!(col.header_text(), "age");
        col.name = Some("Age".to_string());
        assert_eq!(col.header_text(), "Age");
        col.title = Some("Edad".to_string());
        assert_eq!(col.header_text(), "Edad");
    }

    #[test]
    fn test_sheet_options_resolve() {
        let defaults = ExportOptions {
            auto_fit: false,
            ..Default::default()
        };
        let overrides = SheetOptions {
            enable_filters: Some(false),
            ..Default::default()
        };
        let resolved = overrides.resolve(&defaults);
        assert!(!resolved.auto_fit);
        assert!(!resolved.enable_filters);
        assert_eq!(resolved.row_number_text, DEFAULT_ROW_NUMBER_TEXT);
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: ExportOptions = serde_json::from_str(
            r#"{"autoFit": false, "exportWithRowNumbers": true, "summary": {"label": "Total", "values": [10, null]}}"#,
        )
        .unwrap();
        assert!(!options.auto_fit);
        assert!(options.enable_filters);
        assert!(options.export_with_row_numbers);
        let summary = options.summary.unwrap();
        assert_eq!(summary.values, vec![CellValue::Number(10.0), CellValue::empty()]);
    }
}
