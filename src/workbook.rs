//! Workbook assembly: an ordered set of sheets built against shared defaults

use crate::convert::{Encode, XlsxEncoder};
use crate::deliver::{Deliver, FileDelivery, XLSX_EXTENSION, XLSX_MIME_TYPE};
use crate::error::{GridbookError, Result};
use crate::grid::{normalize, GridSource};
use crate::parse::with_extension;
use crate::sheet::{build_sheet, truncate_sheet_name, Sheet};
use crate::source::TableSource;
use crate::types::{ExportOptions, SheetOptions};
use std::path::PathBuf;

/// Multi-sheet workbook.
///
/// Sheets keep insertion order. A sheet whose name matches an existing one
/// (case-insensitively, after truncation) replaces it in place. `add_sheet`
/// is all-or-nothing: on error the workbook is unchanged.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    defaults: ExportOptions,
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(defaults: ExportOptions) -> Self {
        Self {
            defaults,
            sheets: Vec::new(),
        }
    }

    pub fn defaults(&self) -> &ExportOptions {
        &self.defaults
    }

    /// Normalize `source`, build a sheet from it and register it.
    /// Unset fields of `options` fall back to the workbook defaults.
    pub fn add_sheet(
        &mut self,
        name: &str,
        source: GridSource<'_>,
        options: Option<&SheetOptions>,
    ) -> Result<&mut Self> {
        let options = match options {
            Some(overrides) => overrides.resolve(&self.defaults),
            None => self.defaults.clone(),
        };
        let grid = normalize(source, &options)?;
        let sheet = build_sheet(name, grid, &options)?;
        self.insert(sheet);
        Ok(self)
    }

    pub fn add_sheet_from_table(
        &mut self,
        name: &str,
        table: &dyn TableSource,
        options: Option<&SheetOptions>,
    ) -> Result<&mut Self> {
        self.add_sheet(name, GridSource::table(table), options)
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = truncate_sheet_name(name).to_lowercase();
        self.sheets
            .iter()
            .position(|s| s.name().to_lowercase() == key)
    }

    fn insert(&mut self, sheet: Sheet) {
        match self.position(sheet.name()) {
            Some(idx) => {
                log::warn!(
                    "sheet '{}' replaces existing sheet '{}'",
                    sheet.name(),
                    self.sheets[idx].name()
                );
                self.sheets[idx] = sheet;
            }
            None => self.sheets.push(sheet),
        }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Look up a sheet the way names collide: case-insensitively, after
    /// truncation
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.position(name).map(|idx| &self.sheets[idx])
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Encode without delivering
    pub fn encode(&self, encoder: &dyn Encode) -> Result<Vec<u8>> {
        encoder.encode(self)
    }

    /// Encode as xlsx and write to `filename` relative to the current
    /// directory. `.xlsx` is appended when missing.
    pub fn download(self, filename: &str) -> Result<PathBuf> {
        self.download_with(filename, &XlsxEncoder, &FileDelivery::default())
    }

    pub fn download_with(
        self,
        filename: &str,
        encoder: &dyn Encode,
        delivery: &dyn Deliver,
    ) -> Result<PathBuf> {
        if self.is_empty() {
            return Err(GridbookError::EmptyWorkbook);
        }
        let filename = with_extension(filename, XLSX_EXTENSION);
        let bytes = self.encode(encoder)?;
        delivery.deliver(&bytes, &filename, XLSX_MIME_TYPE)
    }
}
