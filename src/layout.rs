//! Layout: column widths, ranges and style placement

use crate::error::Result;
use crate::grid::Grid;
use crate::parse::parse_cell_ref;
use crate::style::CellStyle;
use crate::types::{Cell, CellRange};
use indexmap::IndexMap;

/// Narrowest content width before padding
pub const MIN_COLUMN_WIDTH: usize = 10;

/// Added to the measured width
pub const COLUMN_WIDTH_PADDING: usize = 2;

/// Cap for long content
pub const MAX_COLUMN_WIDTH: usize = 50;

/// Width for content `len` characters long
pub fn column_width_for(len: usize) -> f64 {
    (len.max(MIN_COLUMN_WIDTH) + COLUMN_WIDTH_PADDING).min(MAX_COLUMN_WIDTH) as f64
}

/// One width per column of row 0, from the longest text in that column.
/// Cells missing from short rows measure as empty.
pub fn compute_column_widths(grid: &Grid) -> Vec<f64> {
    (0..grid.column_count())
        .map(|col| {
            let longest = grid
                .rows()
                .iter()
                .map(|row| row.get(col).map_or(0, |v| v.text_len()))
                .max()
                .unwrap_or(0);
            column_width_for(longest)
        })
        .collect()
}

fn last_index(count: usize) -> (u32, u16) {
    // Grids are bounded by the format's row and column limits
    (count.saturating_sub(1) as u32, count.saturating_sub(1) as u16)
}

/// Header-row range for the auto-filter, if enabled and the grid has rows
pub fn compute_auto_filter_range(grid: &Grid, enabled: bool) -> Option<CellRange> {
    if !enabled || grid.is_empty() || grid.column_count() == 0 {
        return None;
    }
    let (_, last_col) = last_index(grid.column_count());
    Some(CellRange::new(0, 0, 0, last_col))
}

/// Range covering every row and every column of row 0
pub fn compute_bounding_range(grid: &Grid) -> Option<CellRange> {
    if grid.is_empty() || grid.column_count() == 0 {
        return None;
    }
    let (last_row, _) = last_index(grid.row_count());
    let (_, last_col) = last_index(grid.column_count());
    Some(CellRange::new(0, 0, last_row, last_col))
}

/// Set `style` on every existing cell of row 0. Empty styles are a no-op.
pub fn apply_header_style(cells: &mut [Vec<Cell>], style: &CellStyle) {
    if style.is_empty() {
        return;
    }
    if let Some(header) = cells.first_mut() {
        for cell in header.iter_mut() {
            cell.style = Some(style.clone());
        }
    }
}

/// Lay each override over the style of the addressed cell. Addresses
/// outside the grid are ignored; malformed addresses are an error.
pub fn apply_cell_styles(
    cells: &mut [Vec<Cell>],
    overrides: &IndexMap<String, CellStyle>,
) -> Result<()> {
    for (address, patch) in overrides {
        let (row, col) = parse_cell_ref(address)?;
        let target = cells
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize));

        match target {
            Some(cell) => {
                let merged = match &cell.style {
                    Some(current) => current.overlay(patch),
                    None => patch.clone(),
                };
                cell.style = Some(merged);
            }
            None => log::debug!("cell style for {} ignored: outside the grid", address),
        }
    }
    Ok(())
}
