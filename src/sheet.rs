//! Sheet building: grid + layout + styles -> [`Sheet`]

use crate::error::{GridbookError, Result};
use crate::grid::Grid;
use crate::layout::{
    apply_cell_styles, apply_header_style, compute_auto_filter_range, compute_bounding_range,
    compute_column_widths,
};
use crate::style::{build_style, CellStyle};
use crate::types::{
    Cell, CellRange, CellValue, ExportOptions, ILLEGAL_SHEET_NAME_CHARS, MAX_SHEET_NAME_LEN,
};
use indexmap::IndexMap;

/// One worksheet of the model
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    cells: Vec<Vec<Cell>>,
    range: Option<CellRange>,
    auto_filter: Option<CellRange>,
    column_widths: Option<Vec<f64>>,
}

impl Sheet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    pub fn value(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cell(row, col).map(|c| &c.value)
    }

    /// Bounding range of the populated cells (`!ref`)
    pub fn range(&self) -> Option<CellRange> {
        self.range
    }

    pub fn auto_filter(&self) -> Option<CellRange> {
        self.auto_filter
    }

    pub fn column_widths(&self) -> Option<&[f64]> {
        self.column_widths.as_deref()
    }
}

/// Truncate to the format's 31-character limit, counted in characters
pub fn truncate_sheet_name(name: &str) -> String {
    name.chars().take(MAX_SHEET_NAME_LEN).collect()
}

fn validate_sheet_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GridbookError::InvalidInput(
            "sheet name must not be empty".to_string(),
        ));
    }
    if let Some(c) = name.chars().find(|c| ILLEGAL_SHEET_NAME_CHARS.contains(c)) {
        return Err(GridbookError::InvalidInput(format!(
            "sheet name '{}' contains illegal character '{}'",
            name, c
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(GridbookError::InvalidInput(format!(
            "sheet name '{}' cannot start or end with an apostrophe",
            name
        )));
    }
    Ok(())
}

/// Build a sheet.
///
/// Styles are resolved before anything else so a bad color fails the call
/// without work. Per-cell overrides are applied after the header style and
/// therefore win for header cells they address.
pub fn build_sheet(name: &str, grid: Grid, options: &ExportOptions) -> Result<Sheet> {
    let name = truncate_sheet_name(name);
    validate_sheet_name(&name)?;

    let header_style: Option<CellStyle> = options
        .header_style
        .as_ref()
        .filter(|spec| !spec.is_empty())
        .map(build_style)
        .transpose()?;
    let cell_styles = options
        .cell_styles
        .iter()
        .map(|(address, spec)| Ok((address.clone(), build_style(spec)?)))
        .collect::<Result<IndexMap<String, CellStyle>>>()?;

    let column_widths = options.auto_fit.then(|| compute_column_widths(&grid));
    let auto_filter = compute_auto_filter_range(&grid, options.enable_filters);
    let range = compute_bounding_range(&grid);

    let mut cells: Vec<Vec<Cell>> = grid
        .into_rows()
        .into_iter()
        .map(|row| row.into_iter().map(Cell::new).collect())
        .collect();

    if let Some(style) = &header_style {
        apply_header_style(&mut cells, style);
    }
    apply_cell_styles(&mut cells, &cell_styles)?;

    log::debug!(
        "built sheet '{}': {} rows, range {}",
        name,
        cells.len(),
        range.map(|r| r.to_string()).unwrap_or_default()
    );

    Ok(Sheet {
        name,
        cells,
        range,
        auto_filter,
        column_widths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::grid_from_rows;
    use crate::style::StyleSpec;
    use pretty_assertions::assert_eq;

    fn people() -> Grid {
        grid_from_rows(vec![
            vec!["Name".into(), "Age".into()],
            vec!["Ana".into(), "30".into()],
            vec!["Bo".into(), "25".into()],
        ])
        .unwrap()
    }

    #[test]
    fn test_people_scenario() {
        let sheet = build_sheet("People", people(), &ExportOptions::default()).unwrap();
        assert_eq!(sheet.name(), "People");
        assert_eq!(sheet.range().unwrap().to_string(), "A1:B3");
        assert_eq!(sheet.auto_filter().unwrap().to_string(), "A1:B1");
        assert_eq!(sheet.column_widths(), Some(&[12.0, 12.0][..]));
        assert_eq!(sheet.value(1, 0), Some(&CellValue::from("Ana")));
    }

    #[test]
    fn test_layout_switches() {
        let options = ExportOptions {
            auto_fit: false,
            enable_filters: false,
            ..Default::default()
        };
        let sheet = build_sheet("People", people(), &options).unwrap();
        assert_eq!(sheet.column_widths(), None);
        assert_eq!(sheet.auto_filter(), None);
        assert!(sheet.range().is_some());
    }

    #[test]
    fn test_long_name_truncated() {
        let long = "Quarterly revenue by region and product line";
        let sheet = build_sheet(long, people(), &ExportOptions::default()).unwrap();
        assert_eq!(sheet.name().chars().count(), 31);
        assert!(long.starts_with(sheet.name()));
    }

    #[test]
    fn test_truncation_counts_chars() {
        let name = "ñ".repeat(40);
        assert_eq!(truncate_sheet_name(&name), "ñ".repeat(31));
    }

    #[test]
    fn test_illegal_names_rejected() {
        for bad in ["", "  ", "a/b", "Q1:Q2", "what?", "'Q1'", "'Q1", "Q1'"] {
            assert!(matches!(
                build_sheet(bad, people(), &ExportOptions::default()),
                Err(GridbookError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_inner_apostrophe_allowed() {
        let sheet = build_sheet("Ana's sheet", people(), &ExportOptions::default()).unwrap();
        assert_eq!(sheet.name(), "Ana's sheet");
    }

    #[test]
    fn test_header_and_cell_styles() {
        let mut cell_styles = IndexMap::new();
        cell_styles.insert("A1".to_string(), StyleSpec::new().fill("#00F"));
        cell_styles.insert("B3".to_string(), StyleSpec::new().italic());
        let options = ExportOptions {
            header_style: Some(StyleSpec::new().bold().fill("#F00")),
            cell_styles,
            ..Default::default()
        };
        let sheet = build_sheet("People", people(), &options).unwrap();

        let a1 = sheet.cell(0, 0).unwrap().style.as_ref().unwrap();
        assert_eq!(a1.fill.unwrap().foreground.as_hex(), "0000FF");
        let b1 = sheet.cell(0, 1).unwrap().style.as_ref().unwrap();
        assert_eq!(b1.fill.unwrap().foreground.as_hex(), "FF0000");
        let b3 = sheet.cell(2, 1).unwrap().style.as_ref().unwrap();
        assert_eq!(b3.font.as_ref().unwrap().italic, Some(true));
        assert!(sheet.cell(1, 0).unwrap().style.is_none());
    }

    #[test]
    fn test_empty_header_style_leaves_cells_plain() {
        let options = ExportOptions {
            header_style: Some(StyleSpec::new()),
            ..Default::default()
        };
        let sheet = build_sheet("People", people(), &options).unwrap();
        assert!(sheet.cell(0, 0).unwrap().style.is_none());
    }

    #[test]
    fn test_bad_color_fails_build() {
        let options = ExportOptions {
            header_style: Some(StyleSpec::new().fill("#XYZ")),
            ..Default::default()
        };
        assert!(matches!(
            build_sheet("People", people(), &options),
            Err(GridbookError::InvalidColor(_))
        ));
    }
}
