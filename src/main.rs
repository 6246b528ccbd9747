//! gridbook CLI - CSV, HTML or JSON to a styled XLSX workbook
//!
//! Usage: gridbook input.csv output.xlsx [--sheet-name "Sheet1"] [--header-bold]

use clap::Parser;
use gridbook::grid::grid_from_json;
use gridbook::{
    columns_from_records, CellValue, ColumnDescriptor, CsvTable, ExportOptions, GridSource,
    GridbookError, HtmlTable, Record, Result, SheetOptions, StyleSpec, Workbook,
    DEFAULT_ROW_NUMBER_TEXT,
};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "gridbook")]
#[command(version)]
#[command(about = "Build a styled XLSX workbook from CSV, HTML or JSON input")]
#[command(
    long_about = "Builds an Excel XLSX workbook, input type chosen by extension:\n\
    - .csv -> one sheet, rows as read\n\
    - .html/.htm -> one sheet from a <table> (see --table-id)\n\
    - .json -> array of arrays (grid), array of objects (records),\n\
      or {\"options\": {...}, \"sheets\": [...]} for a multi-sheet workbook\n\
    Columns are auto-fit and the header row gets an auto-filter unless disabled."
)]
struct Args {
    /// Input file path (.csv, .html, .htm or .json)
    input: String,

    /// Output XLSX file path (.xlsx is appended when missing)
    output: String,

    /// Sheet name (default: "Sheet1")
    #[arg(short, long, default_value = "Sheet1")]
    sheet_name: String,

    /// Keep default column widths
    #[arg(long)]
    no_autofit: bool,

    /// No auto-filter on the header row
    #[arg(long)]
    no_filters: bool,

    /// Bold header row
    #[arg(long)]
    header_bold: bool,

    /// Header fill color, hex (e.g. "#1F4E78")
    #[arg(long, value_name = "COLOR")]
    header_fill: Option<String>,

    /// Header font color, hex
    #[arg(long, value_name = "COLOR")]
    header_font_color: Option<String>,

    /// Prefix record rows with their number (JSON records only)
    #[arg(long)]
    row_numbers: bool,

    /// Header of the row-number column
    #[arg(long, value_name = "TEXT", default_value = DEFAULT_ROW_NUMBER_TEXT)]
    row_number_text: String,

    /// id of the HTML table to export (default: first table)
    #[arg(long, value_name = "ID")]
    table_id: Option<String>,

    /// Show progress information
    #[arg(short, long)]
    verbose: bool,
}

/// Multi-sheet JSON input
#[derive(Debug, Deserialize)]
struct JobFile {
    #[serde(default)]
    options: Option<ExportOptions>,
    sheets: Vec<JobSheet>,
}

#[derive(Debug, Deserialize)]
struct JobSheet {
    name: String,
    #[serde(default)]
    rows: Option<Vec<Vec<CellValue>>>,
    #[serde(default)]
    records: Option<Vec<Record>>,
    #[serde(default)]
    columns: Option<Vec<ColumnDescriptor>>,
    #[serde(default)]
    options: Option<SheetOptions>,
}

impl JobSheet {
    fn into_source(self) -> Result<(String, GridSource<'static>, Option<SheetOptions>)> {
        let source = match (self.rows, self.records) {
            (Some(rows), None) => GridSource::Rows(rows),
            (None, Some(records)) => {
                let columns = self
                    .columns
                    .unwrap_or_else(|| columns_from_records(&records));
                GridSource::records(records, columns)
            }
            _ => {
                return Err(GridbookError::InvalidInput(format!(
                    "sheet '{}' needs exactly one of \"rows\" or \"records\"",
                    self.name
                )))
            }
        };
        Ok((self.name, source, self.options))
    }
}

fn export_options(args: &Args) -> ExportOptions {
    let mut header = StyleSpec::new();
    if args.header_bold {
        header = header.bold();
    }
    if let Some(color) = &args.header_fill {
        header = header.fill(color.as_str());
    }
    if let Some(color) = &args.header_font_color {
        header = header.font_color(color.as_str());
    }

    ExportOptions {
        auto_fit: !args.no_autofit,
        enable_filters: !args.no_filters,
        header_style: (!header.is_empty()).then_some(header),
        export_with_row_numbers: args.row_numbers,
        row_number_text: args.row_number_text.clone(),
        ..Default::default()
    }
}

fn workbook_from_json(value: Value, sheet_name: &str, options: ExportOptions) -> Result<Workbook> {
    match value {
        Value::Object(_) => {
            let job: JobFile = serde_json::from_value(value)?;
            let mut workbook = Workbook::new(job.options.unwrap_or(options));
            for sheet in job.sheets {
                let (name, source, sheet_options) = sheet.into_source()?;
                workbook.add_sheet(&name, source, sheet_options.as_ref())?;
            }
            Ok(workbook)
        }
        Value::Array(items) if items.first().is_some_and(Value::is_object) => {
            let records = items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| match item {
                    Value::Object(map) => Ok(map),
                    _ => Err(GridbookError::InvalidInput(format!(
                        "record {} is not an object",
                        idx
                    ))),
                })
                .collect::<Result<Vec<Record>>>()?;
            let columns = columns_from_records(&records);
            let mut workbook = Workbook::new(options);
            workbook.add_sheet(sheet_name, GridSource::records(records, columns), None)?;
            Ok(workbook)
        }
        other => {
            let grid = grid_from_json(&other)?;
            let mut workbook = Workbook::new(options);
            workbook.add_sheet(sheet_name, GridSource::Rows(grid.into_rows()), None)?;
            Ok(workbook)
        }
    }
}

fn build_workbook(args: &Args) -> Result<Workbook> {
    let options = export_options(args);
    let extension = Path::new(&args.input)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let mut workbook = Workbook::new(options);
            workbook.add_sheet_from_table(&args.sheet_name, &CsvTable::from_path(&args.input), None)?;
            Ok(workbook)
        }
        "html" | "htm" => {
            let mut table = HtmlTable::new(fs::read_to_string(&args.input)?);
            if let Some(id) = &args.table_id {
                table = table.with_id(id.as_str());
            }
            let mut workbook = Workbook::new(options);
            workbook.add_sheet_from_table(&args.sheet_name, &table, None)?;
            Ok(workbook)
        }
        "json" => {
            let value: Value = serde_json::from_str(&fs::read_to_string(&args.input)?)?;
            workbook_from_json(value, &args.sheet_name, options)
        }
        other => Err(GridbookError::InvalidInput(format!(
            "unsupported input type '{}' (expected csv, html, htm or json)",
            other
        ))),
    }
}

fn run(args: &Args) -> Result<(usize, PathBuf)> {
    let workbook = build_workbook(args)?;
    let sheets = workbook.len();
    let path = workbook.download(&args.output)?;
    Ok((sheets, path))
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        eprintln!("gridbook - XLSX workbook builder");
        eprintln!("Input:  {}", args.input);
        eprintln!("Output: {}", args.output);
        eprintln!("Sheet:  {}", args.sheet_name);
    }

    let start = Instant::now();

    match run(&args) {
        Ok((sheets, path)) => {
            if args.verbose {
                eprintln!(
                    "Wrote {} sheet(s) in {:.2}s",
                    sheets,
                    start.elapsed().as_secs_f64()
                );
            }
            println!("OK {} {}", sheets, path.display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
