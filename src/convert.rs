//! Encoding of the workbook model to xlsx bytes with `rust_xlsxwriter`

use crate::error::{GridbookError, Result};
use crate::sheet::Sheet;
use crate::style::{AlignmentStyle, CellStyle, HorizontalAlign, VerticalAlign};
use crate::types::{CellValue, MAX_COLUMNS, MAX_ROWS};
use crate::workbook::Workbook;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, FormatUnderline, Worksheet};

/// Turns a workbook model into file bytes
pub trait Encode {
    fn encode(&self, workbook: &Workbook) -> Result<Vec<u8>>;
}

/// Office Open XML encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxEncoder;

impl Encode for XlsxEncoder {
    fn encode(&self, workbook: &Workbook) -> Result<Vec<u8>> {
        if workbook.is_empty() {
            return Err(GridbookError::EmptyWorkbook);
        }

        let mut xlsx = rust_xlsxwriter::Workbook::new();
        for sheet in workbook.sheets() {
            let worksheet = xlsx.add_worksheet();
            write_sheet(worksheet, sheet)?;
        }

        let bytes = xlsx.save_to_buffer()?;
        log::info!(
            "encoded {} sheet(s) into {} bytes",
            workbook.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Write one sheet: name, cells, widths, autofilter
pub(crate) fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    worksheet.set_name(sheet.name())?;

    for (row_idx, row) in sheet.cells().iter().enumerate() {
        let row_u32 = u32::try_from(row_idx)
            .ok()
            .filter(|r| *r < MAX_ROWS)
            .ok_or_else(|| {
                GridbookError::InvalidInput(format!("row {} exceeds the sheet limit", row_idx))
            })?;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_u16 = u16::try_from(col_idx)
                .ok()
                .filter(|c| *c < MAX_COLUMNS)
                .ok_or_else(|| {
                    GridbookError::InvalidInput(format!(
                        "column {} exceeds the sheet limit",
                        col_idx
                    ))
                })?;
            let format = cell.style.as_ref().map(to_format);
            write_cell(worksheet, row_u32, col_u16, &cell.value, format.as_ref())?;
        }
    }

    // An empty trailing row still counts toward the declared dimension
    if let Some(range) = sheet.range() {
        if sheet.cells().last().is_some_and(Vec::is_empty) {
            worksheet.write_blank(range.last_row, range.first_col, &Format::new())?;
        }
    }

    if let Some(widths) = sheet.column_widths() {
        for (col_idx, width) in widths.iter().enumerate() {
            worksheet.set_column_width(col_idx as u16, *width)?;
        }
    }

    if let Some(filter) = sheet.auto_filter() {
        worksheet.autofilter(
            filter.first_row,
            filter.first_col,
            filter.last_row,
            filter.last_col,
        )?;
    }

    Ok(())
}

/// Write a cell value to the worksheet with optional formatting.
///
/// Empty text is written as a blank cell so the sheet dimension covers it;
/// unformatted blanks add no `<c>` element to the package.
pub(crate) fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    format: Option<&Format>,
) -> Result<()> {
    match (value, format) {
        (CellValue::String(s), Some(fmt)) if s.is_empty() => {
            worksheet.write_blank(row, col, fmt)?;
        }
        (CellValue::String(s), None) if s.is_empty() => {
            worksheet.write_blank(row, col, &Format::new())?;
        }
        (CellValue::String(s), Some(fmt)) => {
            worksheet.write_string_with_format(row, col, s, fmt)?;
        }
        (CellValue::String(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
        (CellValue::Number(n), Some(fmt)) => {
            worksheet.write_number_with_format(row, col, *n, fmt)?;
        }
        (CellValue::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (CellValue::Boolean(b), Some(fmt)) => {
            worksheet.write_boolean_with_format(row, col, *b, fmt)?;
        }
        (CellValue::Boolean(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}

/// Map a resolved style onto a `rust_xlsxwriter` format
pub(crate) fn to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if let Some(font) = &style.font {
        if font.bold == Some(true) {
            format = format.set_bold();
        }
        if font.italic == Some(true) {
            format = format.set_italic();
        }
        if font.underline == Some(true) {
            format = format.set_underline(FormatUnderline::Single);
        }
        if let Some(size) = font.size {
            format = format.set_font_size(size);
        }
        if let Some(name) = &font.name {
            format = format.set_font_name(name);
        }
        if let Some(color) = font.color {
            format = format.set_font_color(Color::RGB(color.rgb()));
        }
    }

    if let Some(fill) = &style.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_foreground_color(Color::RGB(fill.foreground.rgb()))
            .set_background_color(Color::RGB(fill.background.rgb()));
    }

    if let Some(alignment) = &style.alignment {
        format = apply_alignment(format, alignment);
    }

    format
}

fn apply_alignment(mut format: Format, alignment: &AlignmentStyle) -> Format {
    if let Some(horizontal) = alignment.horizontal {
        format = format.set_align(match horizontal {
            HorizontalAlign::General => FormatAlign::General,
            HorizontalAlign::Left => FormatAlign::Left,
            HorizontalAlign::Center => FormatAlign::Center,
            HorizontalAlign::Right => FormatAlign::Right,
            HorizontalAlign::Fill => FormatAlign::Fill,
            HorizontalAlign::Justify => FormatAlign::Justify,
        });
    }
    if let Some(vertical) = alignment.vertical {
        format = format.set_align(match vertical {
            VerticalAlign::Top => FormatAlign::Top,
            VerticalAlign::Center => FormatAlign::VerticalCenter,
            VerticalAlign::Bottom => FormatAlign::Bottom,
        });
    }
    if alignment.wrap_text == Some(true) {
        format = format.set_text_wrap();
    }
    format
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSource;
    use crate::style::StyleSpec;
    use crate::types::{CellValue, ColumnDescriptor, ExportOptions};
    use std::io::{Cursor, Read};

    fn package_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    fn encode_one(options: ExportOptions, source: GridSource<'_>) -> Vec<u8> {
        let mut workbook = Workbook::new(options);
        workbook.add_sheet("Sheet1", source, None).unwrap();
        XlsxEncoder.encode(&workbook).unwrap()
    }

    #[test]
    fn test_encode_produces_zip() {
        let mut workbook = Workbook::new(ExportOptions::default());
        workbook
            .add_sheet(
                "People",
                GridSource::rows(vec![vec!["Name", "Age"], vec!["Ana", "30"]]),
                None,
            )
            .unwrap();
        let bytes = XlsxEncoder.encode(&workbook).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_encode_empty_workbook_fails() {
        let workbook = Workbook::new(ExportOptions::default());
        assert!(matches!(
            XlsxEncoder.encode(&workbook),
            Err(GridbookError::EmptyWorkbook)
        ));
    }

    #[test]
    fn test_encode_styled_mixed_values() {
        let options = ExportOptions {
            header_style: Some(
                StyleSpec::new()
                    .bold()
                    .fill("#1F4E78")
                    .font_color("#FFF")
                    .align(HorizontalAlign::Center)
                    .valign(VerticalAlign::Center)
                    .wrap_text(),
            ),
            ..Default::default()
        };
        let mut workbook = Workbook::new(options);
        workbook
            .add_sheet(
                "Mixed",
                GridSource::Rows(vec![
                    vec!["label".into(), "value".into(), "flag".into()],
                    vec!["".into(), 1.0e17.into(), true.into()],
                    vec!["x".into(), 1.5.into(), false.into()],
                ]),
                None,
            )
            .unwrap();
        let bytes = XlsxEncoder.encode(&workbook).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_package_carries_layout_and_header_format() {
        let options = ExportOptions {
            header_style: Some(StyleSpec::new().bold().fill("#1F4E78")),
            ..Default::default()
        };
        let bytes = encode_one(
            options,
            GridSource::rows(vec![
                vec!["Name", "Age"],
                vec!["Ana", "30"],
                vec!["Bo", "25"],
            ]),
        );

        let sheet = package_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<dimension ref="A1:B3"/>"#), "{}", sheet);
        assert!(sheet.contains(r#"<autoFilter ref="A1:B1"/>"#), "{}", sheet);
        assert!(sheet.contains(r#"customWidth="1""#), "{}", sheet);

        let styles = package_part(&bytes, "xl/styles.xml");
        assert!(styles.contains(r#"<patternFill patternType="solid">"#), "{}", styles);
        assert!(styles.contains("1F4E78"), "{}", styles);
        assert!(styles.contains("<b/>"), "{}", styles);
    }

    #[test]
    fn test_null_last_record_stays_in_dimension() {
        let records = serde_json::json!([{"a": 1, "b": 2}, {"a": null, "b": null}])
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect();
        let columns = vec![ColumnDescriptor::new("a"), ColumnDescriptor::new("b")];
        let bytes = encode_one(
            ExportOptions::default(),
            GridSource::records(records, columns),
        );

        let sheet = package_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<dimension ref="A1:B3"/>"#), "{}", sheet);
    }

    #[test]
    fn test_empty_trailing_row_stays_in_dimension() {
        let bytes = encode_one(
            ExportOptions::default(),
            GridSource::Rows(vec![
                vec!["a".into(), "b".into()],
                vec!["c".into(), "d".into()],
                vec![],
            ]),
        );
        let sheet = package_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<dimension ref="A1:B3"/>"#), "{}", sheet);
    }

    #[test]
    fn test_large_whole_numbers_stay_numeric() {
        let bytes = encode_one(
            ExportOptions {
                enable_filters: false,
                ..Default::default()
            },
            GridSource::Rows(vec![vec![CellValue::from_json(
                &serde_json::json!(12345678901234567890u64),
            )]]),
        );
        let sheet = package_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(!sheet.contains(r#"t="s""#), "{}", sheet);
        assert!(sheet.contains("<v>"), "{}", sheet);
    }
}
