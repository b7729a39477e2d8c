//! Cell clipboard.
//!
//! A copy takes a value snapshot of the selected cells in column-major order.
//! Later edits to the source cells don't reach the snapshot. The snapshot
//! lives until the next copy; there's no clear.

use serde::{Deserialize, Serialize};

use gridpad_core::{Point, Range};

use crate::cell::Cell;
use crate::sheet::{Sheet, COLUMNS, ROWS};

/// Where pasted cells land relative to the anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasteLayout {
    /// Lay the flat snapshot out in rows the full grid width wide:
    /// index `i` goes to `(anchor.col + i % COLUMNS, anchor.row + i / COLUMNS)`.
    /// A copied sub-rectangle does not keep its shape.
    #[default]
    Reflow,
    /// Put each cell back at its offset inside the copied rectangle.
    Rectangle,
}

/// Copied cells plus the height of the rectangle they were copied from.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    cells: Vec<Cell>,
    height: usize,
}

impl Snapshot {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Destination of snapshot index `i`, or None if it falls off the grid.
    pub fn destination(&self, i: usize, anchor: Point, layout: PasteLayout) -> Option<Point> {
        let (d_col, d_row) = match layout {
            PasteLayout::Reflow => (i % COLUMNS, i / COLUMNS),
            // Snapshot is column-major, so each run of `height` cells is one column
            PasteLayout::Rectangle => (i / self.height.max(1), i % self.height.max(1)),
        };
        let col = anchor.col + d_col;
        let row = anchor.row + d_row;
        (col < COLUMNS && row < ROWS).then_some(Point::new(col, row))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    snapshot: Option<Snapshot>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clipboard with a snapshot of `selection`. `None` copies
    /// nothing and leaves an empty snapshot. Returns the number of cells copied.
    pub fn copy(&mut self, sheet: &Sheet, selection: Option<Range>) -> usize {
        let snapshot = match selection {
            Some(range) => Snapshot {
                cells: range.cells().map(|p| sheet.cell(p.col, p.row).clone()).collect(),
                height: range.height(),
            },
            None => Snapshot {
                cells: Vec::new(),
                height: 0,
            },
        };
        let len = snapshot.len();
        self.snapshot = Some(snapshot);
        len
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// True once something non-empty has been copied.
    pub fn has_content(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Destinations and cells for a paste at `anchor`, in snapshot order.
    /// Cells that would land off the grid are left out.
    pub fn paste_targets(&self, anchor: Point, layout: PasteLayout) -> Vec<(Point, Cell)> {
        let Some(snapshot) = &self.snapshot else {
            return Vec::new();
        };
        snapshot
            .cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| {
                snapshot
                    .destination(i, anchor, layout)
                    .map(|p| (p, cell.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellPatch;

    fn sheet_with_block() -> Sheet {
        // A1="a", A2="b", B1="c", B2="d"
        let mut sheet = Sheet::new();
        sheet.update_cell(0, 0, CellPatch::new().value("a"));
        sheet.update_cell(0, 1, CellPatch::new().value("b"));
        sheet.update_cell(1, 0, CellPatch::new().value("c"));
        sheet.update_cell(1, 1, CellPatch::new().value("d"));
        sheet
    }

    fn block() -> Range {
        Range::new(Point::new(0, 0), Point::new(1, 1))
    }

    #[test]
    fn test_copy_column_major() {
        let sheet = sheet_with_block();
        let mut clip = Clipboard::new();
        assert_eq!(clip.copy(&sheet, Some(block())), 4);

        let values: Vec<&str> = clip
            .snapshot()
            .unwrap()
            .cells()
            .iter()
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(values, vec!["a", "b", "c", "d"]);
        let snapshot = clip.snapshot().unwrap();
        assert_eq!(snapshot.height, 2);
    }

    #[test]
    fn test_copy_nothing() {
        let sheet = Sheet::new();
        let mut clip = Clipboard::new();
        assert_eq!(clip.copy(&sheet, None), 0);
        assert!(!clip.has_content());
        assert!(clip.paste_targets(Point::new(0, 0), PasteLayout::Reflow).is_empty());
    }

    #[test]
    fn test_reflow_uses_grid_width() {
        let sheet = sheet_with_block();
        let mut clip = Clipboard::new();
        clip.copy(&sheet, Some(block()));

        let targets = clip.paste_targets(Point::new(3, 10), PasteLayout::Reflow);
        let points: Vec<Point> = targets.iter().map(|(p, _)| *p).collect();
        assert_eq!(
            points,
            vec![Point::new(3, 10), Point::new(4, 10), Point::new(5, 10), Point::new(6, 10)]
        );
        assert_eq!(targets[2].1.value, "c");
    }

    #[test]
    fn test_rectangle_keeps_shape() {
        let sheet = sheet_with_block();
        let mut clip = Clipboard::new();
        clip.copy(&sheet, Some(block()));

        let targets = clip.paste_targets(Point::new(3, 10), PasteLayout::Rectangle);
        let placed: Vec<(Point, &str)> = targets.iter().map(|(p, c)| (*p, c.value.as_str())).collect();
        assert_eq!(
            placed,
            vec![
                (Point::new(3, 10), "a"),
                (Point::new(3, 11), "b"),
                (Point::new(4, 10), "c"),
                (Point::new(4, 11), "d"),
            ]
        );
    }

    #[test]
    fn test_off_grid_targets_skipped() {
        let sheet = sheet_with_block();
        let mut clip = Clipboard::new();
        clip.copy(&sheet, Some(block()));

        // Reflow from Y50: only Y50 and Z50 fit
        let targets = clip.paste_targets(Point::new(24, 49), PasteLayout::Reflow);
        let points: Vec<Point> = targets.iter().map(|(p, _)| *p).collect();
        assert_eq!(points, vec![Point::new(24, 49), Point::new(25, 49)]);

        let targets = clip.paste_targets(Point::new(25, 49), PasteLayout::Rectangle);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].1.value, "a");
    }

    #[test]
    fn test_snapshot_isolated_from_edits() {
        let mut sheet = sheet_with_block();
        let mut clip = Clipboard::new();
        clip.copy(&sheet, Some(block()));
        sheet.update_cell(0, 0, CellPatch::new().value("changed"));
        assert_eq!(clip.snapshot().unwrap().cells()[0].value, "a");
    }
}
