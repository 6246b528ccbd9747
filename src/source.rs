//! Table sources: things that resolve to rows of cell text
//!
//! The grid normalizer only needs raw text per cell. Whitespace collapsing
//! and trimming happen there, so sources hand back text as found.

use crate::error::{GridbookError, Result};
use csv::ReaderBuilder;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use std::path::PathBuf;

/// Raw table text, row-major, header row included
pub type RawTable = Vec<Vec<String>>;

/// A source that can be resolved to a table.
///
/// `Ok(None)` means the source exists but is not table-shaped (e.g. no
/// `<table>` matched); the normalizer reports that as an invalid source.
pub trait TableSource {
    fn resolve_table(&self) -> Result<Option<RawTable>>;
}

impl<S: AsRef<str>> TableSource for Vec<Vec<S>> {
    fn resolve_table(&self) -> Result<Option<RawTable>> {
        Ok(Some(
            self.iter()
                .map(|row| row.iter().map(|s| s.as_ref().to_string()).collect())
                .collect(),
        ))
    }
}

#[derive(Debug, Clone)]
enum CsvOrigin {
    Path(PathBuf),
    Text(String),
}

/// Delimited text read with the `csv` crate. Rows may be ragged.
#[derive(Debug, Clone)]
pub struct CsvTable {
    origin: CsvOrigin,
    delimiter: u8,
}

impl CsvTable {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: CsvOrigin::Path(path.into()),
            delimiter: b',',
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            origin: CsvOrigin::Text(text.into()),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl TableSource for CsvTable {
    fn resolve_table(&self) -> Result<Option<RawTable>> {
        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter);

        let rows = match &self.origin {
            CsvOrigin::Path(path) => read_records(builder.from_path(path)?)?,
            CsvOrigin::Text(text) => read_records(builder.from_reader(text.as_bytes()))?,
        };
        log::debug!("csv source resolved to {} rows", rows.len());
        Ok(Some(rows))
    }
}

fn read_records<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<RawTable> {
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(rows)
}

/// A `<table>` inside well-formed (X)HTML markup.
///
/// Cells are the `<th>`/`<td>` children of the table's own rows; text of
/// nested tables is folded into the enclosing cell. `<script>` and `<style>`
/// content is not visible and is skipped.
#[derive(Debug, Clone)]
pub struct HtmlTable {
    markup: String,
    table_id: Option<String>,
}

impl HtmlTable {
    /// Use the first `<table>` in `markup`
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            table_id: None,
        }
    }

    /// Use the `<table>` whose `id` attribute equals `id`
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.table_id = Some(id.into());
        self
    }

    fn is_target(&self, table: &BytesStart<'_>) -> bool {
        let Some(wanted) = &self.table_id else {
            return true;
        };
        match table.try_get_attribute("id") {
            Ok(Some(attr)) => attr
                .unescape_value()
                .map(|v| v == wanted.as_str())
                .unwrap_or(false),
            _ => false,
        }
    }
}

fn element_name(e: &BytesStart<'_>) -> Vec<u8> {
    e.local_name().as_ref().to_ascii_lowercase()
}

fn decode_text(text: &BytesText<'_>) -> String {
    match text.unescape() {
        Ok(s) => s.into_owned(),
        Err(_) => String::from_utf8_lossy(text).into_owned(),
    }
}

impl TableSource for HtmlTable {
    fn resolve_table(&self) -> Result<Option<RawTable>> {
        // quick-xml knows only the XML entities
        let markup = self.markup.replace("&nbsp;", "&#160;");
        let mut reader = Reader::from_str(&markup);
        reader.config_mut().trim_text(false);
        reader.config_mut().check_end_names = false;

        // Table nesting depth inside the target; 0 = outside
        let mut depth = 0usize;
        let mut found = false;
        let mut hidden = 0usize;
        let mut rows: RawTable = Vec::new();
        let mut row: Option<Vec<String>> = None;
        let mut cell: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match element_name(&e).as_slice() {
                    b"table" if depth > 0 => depth += 1,
                    b"table" if !found && self.is_target(&e) => {
                        found = true;
                        depth = 1;
                    }
                    b"tr" if depth == 1 => row = Some(Vec::new()),
                    b"td" | b"th" if depth == 1 && row.is_some() => cell = Some(String::new()),
                    b"script" | b"style" => hidden += 1,
                    _ => {}
                },
                Ok(Event::End(e)) => match e.local_name().as_ref().to_ascii_lowercase().as_slice() {
                    b"table" if depth > 0 => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    b"tr" if depth == 1 => {
                        if let Some(finished) = row.take() {
                            rows.push(finished);
                        }
                    }
                    b"td" | b"th" if depth == 1 => {
                        if let (Some(text), Some(current)) = (cell.take(), row.as_mut()) {
                            current.push(text);
                        }
                    }
                    b"script" | b"style" => hidden = hidden.saturating_sub(1),
                    _ => {}
                },
                Ok(Event::Empty(e)) => match element_name(&e).as_slice() {
                    b"td" | b"th" if depth == 1 => {
                        if let Some(current) = row.as_mut() {
                            current.push(String::new());
                        }
                    }
                    b"br" => {
                        if let Some(text) = cell.as_mut() {
                            text.push(' ');
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(t)) if hidden == 0 => {
                    if let Some(text) = cell.as_mut() {
                        text.push_str(&decode_text(&t));
                    }
                }
                Ok(Event::CData(t)) if hidden == 0 => {
                    if let Some(text) = cell.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&t));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(GridbookError::InvalidSource(format!(
                        "malformed markup at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
        }

        if !found {
            log::debug!("no matching <table> found (id: {:?})", self.table_id);
            return Ok(None);
        }
        Ok(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vec_source() {
        let rows = vec![vec!["a", "b"], vec!["c", "d"]];
        assert_eq!(
            rows.resolve_table().unwrap(),
            Some(vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
            ])
        );
    }

    #[test]
    fn test_csv_text_source() {
        let table = CsvTable::from_text("Name,Age\nAna,30\nBo\n");
        let rows = table.resolve_table().unwrap().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Name", "Age"]);
        assert_eq!(rows[2], vec!["Bo"]);
    }

    #[test]
    fn test_csv_delimiter() {
        let table = CsvTable::from_text("a;b\n1;2\n").with_delimiter(b';');
        let rows = table.resolve_table().unwrap().unwrap();
        assert_eq!(rows[1], vec!["1", "2"]);
    }

    #[test]
    fn test_csv_missing_file() {
        let table = CsvTable::from_path("/nonexistent/gridbook/input.csv");
        assert!(matches!(
            table.resolve_table(),
            Err(GridbookError::Csv(_))
        ));
    }

    #[test]
    fn test_html_table() {
        let html = r#"<div><table>
            <thead><tr><th>Name</th><th>Total  due</th></tr></thead>
            <tbody>
              <tr><td> Ana </td><td>1&amp;2</td></tr>
              <tr><td><b>Bo</b><br/>Smith</td><td/></tr>
            </tbody>
          </table></div>"#;
        let rows = HtmlTable::new(html).resolve_table().unwrap().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Name", "Total  due"]);
        assert_eq!(rows[1], vec![" Ana ", "1&2"]);
        assert_eq!(rows[2], vec!["Bo Smith", ""]);
    }

    #[test]
    fn test_html_table_by_id() {
        let html = r#"<body>
            <table id="first"><tr><td>x</td></tr></table>
            <table id="second"><tr><td>y</td></tr></table>
          </body>"#;
        let rows = HtmlTable::new(html)
            .with_id("second")
            .resolve_table()
            .unwrap()
            .unwrap();
        assert_eq!(rows, vec![vec!["y".to_string()]]);
    }

    #[test]
    fn test_html_skips_script_and_folds_nested() {
        let html = r#"<table><tr><td>a<script>var x = 1;</script></td>
            <td><table><tr><td>inner</td></tr></table></td></tr></table>"#;
        let rows = HtmlTable::new(html).resolve_table().unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "a");
        assert_eq!(rows[0][1], "inner");
    }

    #[test]
    fn test_html_without_table() {
        let html = "<div><p>no table here</p></div>";
        assert_eq!(HtmlTable::new(html).resolve_table().unwrap(), None);
        let html = r#"<table id="a"><tr><td>x</td></tr></table>"#;
        assert_eq!(
            HtmlTable::new(html).with_id("b").resolve_table().unwrap(),
            None
        );
    }
}
