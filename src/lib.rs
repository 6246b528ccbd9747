//! gridbook - Styled multi-sheet Excel workbooks from in-memory data
//!
//! Three kinds of input become sheets of one workbook:
//! - Raw grids (rows of values, row 0 is the header)
//! - Keyed records read through column descriptors, with optional row
//!   numbers and a summary row
//! - Tables resolved from a source (CSV text, HTML markup)
//!
//! Sheets get auto-fit column widths, a header auto-filter, a header style
//! and per-cell style overrides. The workbook is encoded as xlsx with
//! `rust_xlsxwriter` and written to disk.
//!
//! ```no_run
//! use gridbook::{ExportOptions, GridSource, StyleSpec, Workbook};
//!
//! # fn main() -> gridbook::Result<()> {
//! let options = ExportOptions {
//!     header_style: Some(StyleSpec::new().bold().fill("#1F4E78").font_color("#FFF")),
//!     ..Default::default()
//! };
//! let mut workbook = Workbook::new(options);
//! workbook
//!     .add_sheet("People", GridSource::rows(vec![vec!["Name", "Age"], vec!["Ana", "30"]]), None)?
//!     .add_sheet("Totals", GridSource::rows(vec![vec!["Total"], vec!["30"]]), None)?;
//! workbook.download("report")?;
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod deliver;
pub mod error;
pub mod grid;
pub mod layout;
pub mod parse;
pub mod sheet;
pub mod source;
pub mod style;
pub mod types;
pub mod workbook;

pub use convert::{Encode, XlsxEncoder};
pub use deliver::{Deliver, FileDelivery, XLSX_EXTENSION, XLSX_MIME_TYPE};
pub use error::{GridbookError, Result};
pub use grid::{
    columns_from_records, normalize, records_from_serialize, Grid, GridSource, Record,
    RecordsInput,
};
pub use parse::{column_name, encode_cell_ref, parse_cell_ref, parse_color};
pub use sheet::{build_sheet, truncate_sheet_name, Sheet};
pub use source::{CsvTable, HtmlTable, RawTable, TableSource};
pub use style::{
    build_style, resolve_color, AlignmentSpec, CellStyle, Color, ColorSpec, FontSpec,
    HorizontalAlign, StyleSpec, VerticalAlign,
};
pub use types::{
    Cell, CellRange, CellValue, ColumnDescriptor, ExportOptions, SheetOptions, SummaryRow,
    DEFAULT_ROW_NUMBER_TEXT,
};
pub use workbook::Workbook;

use std::path::PathBuf;

fn export_one(
    source: GridSource<'_>,
    filename: &str,
    sheet_name: &str,
    options: &ExportOptions,
) -> Result<PathBuf> {
    let mut workbook = Workbook::new(options.clone());
    workbook.add_sheet(sheet_name, source, None)?;
    workbook.download(filename)
}

/// Export a raw grid as a one-sheet workbook. Returns the written path.
pub fn export_grid(
    rows: Vec<Vec<CellValue>>,
    filename: &str,
    sheet_name: &str,
    options: &ExportOptions,
) -> Result<PathBuf> {
    export_one(GridSource::Rows(rows), filename, sheet_name, options)
}

/// Export records through column descriptors as a one-sheet workbook
pub fn export_records(
    records: Vec<Record>,
    columns: Vec<ColumnDescriptor>,
    filename: &str,
    sheet_name: &str,
    options: &ExportOptions,
) -> Result<PathBuf> {
    export_one(
        GridSource::records(records, columns),
        filename,
        sheet_name,
        options,
    )
}

/// Export a resolved table as a one-sheet workbook
pub fn export_table(
    table: &dyn TableSource,
    filename: &str,
    sheet_name: &str,
    options: &ExportOptions,
) -> Result<PathBuf> {
    export_one(GridSource::table(table), filename, sheet_name, options)
}
