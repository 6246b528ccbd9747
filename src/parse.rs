//! Parsing and utility functions for colors and A1 cell references

use crate::error::{GridbookError, Result};
use crate::style::Color;
use crate::types::{MAX_COLUMNS, MAX_ROWS};

/// Parse a hex color (`#RGB`, `RGB`, `#RRGGBB` or `RRGGBB`) into its
/// canonical form. Shorthand digits are doubled: `#ABC` -> `AABBCC`.
pub fn parse_color(color_str: &str) -> Result<Color> {
    let color = color_str.trim();
    let hex = color.strip_prefix('#').unwrap_or(color);

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(GridbookError::InvalidColor(format!(
            "'{}' contains non-hex characters",
            color_str
        )));
    }

    let expanded = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => hex.to_string(),
        n => {
            return Err(GridbookError::InvalidColor(format!(
                "'{}': expected 3 or 6 hex digits, got {}",
                color_str, n
            )))
        }
    };

    u32::from_str_radix(&expanded, 16)
        .map(Color::from_rgb)
        .map_err(|_| GridbookError::InvalidColor(color_str.to_string()))
}

/// Parse a cell reference like "A1" (or "$b$2") into (row, col) - 0-based
pub fn parse_cell_ref(cell_ref: &str) -> Result<(u32, u16)> {
    let normalized: String = cell_ref
        .trim()
        .chars()
        .filter(|c| *c != '$')
        .collect::<String>()
        .to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(GridbookError::InvalidCellRef(
            "empty cell reference".to_string(),
        ));
    }

    // Find where letters end and numbers begin
    let col_end = normalized
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .count();
    if col_end == 0 {
        return Err(GridbookError::InvalidCellRef(format!(
            "'{}': no column letters",
            cell_ref
        )));
    }

    let col_str = &normalized[..col_end];
    let row_str = &normalized[col_end..];

    if row_str.is_empty() || !row_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(GridbookError::InvalidCellRef(format!(
            "'{}': expected a row number after the column letters",
            cell_ref
        )));
    }

    // A=1, B=2, ..., Z=26, AA=27; checked so long letter runs cannot overflow
    let col_1based = col_str.bytes().try_fold(0u32, |acc, b| {
        acc.checked_mul(26)?.checked_add(u32::from(b - b'A') + 1)
    });
    let col = match col_1based {
        Some(c) if c <= u32::from(MAX_COLUMNS) => (c - 1) as u16,
        _ => {
            return Err(GridbookError::InvalidCellRef(format!(
                "'{}': column is beyond XFD",
                cell_ref
            )))
        }
    };

    // Excel rows are 1-based
    let row_1based: u32 = row_str.parse().map_err(|_| {
        GridbookError::InvalidCellRef(format!("'{}': invalid row number", cell_ref))
    })?;
    if row_1based == 0 || row_1based > MAX_ROWS {
        return Err(GridbookError::InvalidCellRef(format!(
            "'{}': row must be between 1 and {}",
            cell_ref, MAX_ROWS
        )));
    }

    Ok((row_1based - 1, col))
}

/// Column letters for a 0-based column index (0 -> "A", 26 -> "AA")
pub fn column_name(col: u16) -> String {
    let mut n = u32::from(col) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// A1 address of a 0-based (row, col)
pub fn encode_cell_ref(row: u32, col: u16) -> String {
    format!("{}{}", column_name(col), row + 1)
}

/// Collapse internal whitespace runs to single spaces and trim
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Ensure `filename` ends in `extension`, compared case-insensitively
pub(crate) fn with_extension(filename: &str, extension: &str) -> String {
    if filename
        .to_ascii_lowercase()
        .ends_with(&extension.to_ascii_lowercase())
    {
        filename.to_string()
    } else {
        format!("{}{}", filename, extension)
    }
}
