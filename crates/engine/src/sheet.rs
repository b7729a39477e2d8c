use serde::{Deserialize, Serialize};

use gridpad_core::Point;

use super::cell::{Cell, CellPatch};

/// Number of columns in the grid (A..Z).
pub const COLUMNS: usize = 26;
/// Number of rows in the grid.
pub const ROWS: usize = 50;

/// Fixed-size grid of cells, stored column-major.
///
/// Every in-range coordinate always holds a cell. Out-of-range access is a
/// caller bug and panics; use `try_cell` when the coordinate comes from
/// somewhere unvalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    columns: Vec<Vec<Cell>>,
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Sheet {
    /// A grid of default cells.
    pub fn new() -> Self {
        Self {
            columns: vec![vec![Cell::default(); ROWS]; COLUMNS],
        }
    }

    /// Refill the grid with default cells, discarding every edit.
    pub fn initialize(&mut self) {
        self.columns = vec![vec![Cell::default(); ROWS]; COLUMNS];
    }

    pub fn in_bounds(col: usize, row: usize) -> bool {
        col < COLUMNS && row < ROWS
    }

    /// The cell at (col, row). Panics when out of range.
    pub fn cell(&self, col: usize, row: usize) -> &Cell {
        assert!(
            Self::in_bounds(col, row),
            "cell ({}, {}) out of range for {}x{} grid",
            col, row, COLUMNS, ROWS
        );
        &self.columns[col][row]
    }

    pub fn try_cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.columns.get(col).and_then(|c| c.get(row))
    }

    /// Merge `patch` over the cell at (col, row). Returns whether anything changed.
    /// Values are not validated. Panics when out of range.
    pub fn update_cell(&mut self, col: usize, row: usize, patch: CellPatch) -> bool {
        assert!(
            Self::in_bounds(col, row),
            "cell ({}, {}) out of range for {}x{} grid",
            col, row, COLUMNS, ROWS
        );
        patch.apply_to(&mut self.columns[col][row])
    }

    /// All cells, column-major.
    pub fn cells(&self) -> impl Iterator<Item = (Point, &Cell)> {
        self.columns.iter().enumerate().flat_map(|(c, column)| {
            column.iter().enumerate().map(move |(r, cell)| (Point::new(c, r), cell))
        })
    }

    pub fn is_default(&self, col: usize, row: usize) -> bool {
        self.cell(col, row).is_default()
    }

    /// Number of cells that differ from the default record.
    pub fn edited_count(&self) -> usize {
        self.cells().filter(|(_, cell)| !cell.is_default()).count()
    }
}
