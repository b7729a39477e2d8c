use serde::{Deserialize, Serialize};

/// A grid coordinate, zero-based on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub col: usize,
    pub row: usize,
}

impl Point {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

impl From<(usize, usize)> for Point {
    fn from((col, row): (usize, usize)) -> Self {
        Self { col, row }
    }
}

/// A rectangular range of cells, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start_col: usize,
    pub start_row: usize,
    pub end_col: usize,
    pub end_row: usize,
}

impl Range {
    /// Create a new range spanning two corners, normalizing each axis so start <= end.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            start_col: a.col.min(b.col),
            start_row: a.row.min(b.row),
            end_col: a.col.max(b.col),
            end_row: a.row.max(b.row),
        }
    }

    /// Create a single-cell range.
    pub fn single(p: Point) -> Self {
        Self {
            start_col: p.col,
            start_row: p.row,
            end_col: p.col,
            end_row: p.row,
        }
    }

    /// Check if this range contains a cell.
    pub fn contains(&self, p: Point) -> bool {
        p.col >= self.start_col && p.col <= self.end_col &&
        p.row >= self.start_row && p.row <= self.end_row
    }

    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    pub fn height(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    /// Number of cells in this range.
    pub fn cell_count(&self) -> usize {
        self.width() * self.height()
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.start_col, self.start_row)
    }

    /// Iterate over all cells in this range, column-major: columns ascending
    /// on the outside, rows ascending within each column.
    pub fn cells(&self) -> impl Iterator<Item = Point> {
        let start_col = self.start_col;
        let end_col = self.end_col;
        let start_row = self.start_row;
        let end_row = self.end_row;

        (start_col..=end_col).flat_map(move |c| {
            (start_row..=end_row).map(move |r| Point::new(c, r))
        })
    }

    /// Check if this is a single cell.
    pub fn is_single(&self) -> bool {
        self.start_col == self.end_col && self.start_row == self.end_row
    }
}

/// Drag gesture state. A drag is cancelled simply by never extending or ending it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DragState {
    #[default]
    Inactive,
    Active,
}

/// Holds the active rectangular selection and the in-progress drag gesture.
///
/// The rectangle is always recomputed from the gesture's origin and the
/// latest point; it is never patched incrementally.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    range: Option<Range>,
    origin: Option<Point>,
    drag: DragState,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a drag at `p`. The selection becomes the single cell at `p`.
    pub fn start_selection(&mut self, p: Point) {
        self.origin = Some(p);
        self.drag = DragState::Active;
        self.range = Some(Range::single(p));
    }

    /// Recompute the selection as the rectangle between the drag origin and `p`.
    /// Returns false (and does nothing) when no drag is active.
    pub fn extend_selection(&mut self, p: Point) -> bool {
        if self.drag != DragState::Active {
            return false;
        }
        let Some(origin) = self.origin else {
            return false;
        };
        self.range = Some(Range::new(origin, p));
        true
    }

    /// Finish the drag. The selection stays as last computed.
    pub fn end_selection(&mut self) {
        self.drag = DragState::Inactive;
    }

    pub fn is_active(&self) -> bool {
        self.drag == DragState::Active
    }

    /// The selected rectangle, if any gesture has happened yet.
    pub fn range(&self) -> Option<Range> {
        self.range
    }

    /// Selected coordinates in column-major order. Empty before any gesture.
    pub fn cells(&self) -> Vec<Point> {
        self.range.map(|r| r.cells().collect()).unwrap_or_default()
    }

    /// Total number of selected cells.
    pub fn cell_count(&self) -> usize {
        self.range.map(|r| r.cell_count()).unwrap_or(0)
    }

    /// Check if a cell is selected.
    pub fn contains(&self, p: Point) -> bool {
        self.range.is_some_and(|r| r.contains(p))
    }

    /// First selected coordinate in enumeration order (the rectangle's top-left).
    pub fn anchor(&self) -> Option<Point> {
        self.range.map(|r| r.top_left())
    }

    /// Select a single cell as one complete gesture (click or arrow key).
    pub fn select_cell(&mut self, p: Point) {
        self.start_selection(p);
        self.end_selection();
    }

    /// Extend from the last gesture's origin to `p` as one complete gesture
    /// (shift+click / shift+arrow). Behaves like `select_cell` when there is no origin yet.
    pub fn extend_to(&mut self, p: Point) {
        if self.origin.is_none() {
            self.select_cell(p);
            return;
        }
        let was_active = self.is_active();
        self.drag = DragState::Active;
        self.extend_selection(p);
        if !was_active {
            self.end_selection();
        }
    }

    /// Move the cursor by a delta, collapsing to a single cell.
    pub fn move_by(&mut self, d_col: isize, d_row: isize, max_col: usize, max_row: usize) {
        let current = self.cursor().unwrap_or_default();
        let next = offset_clamped(current, d_col, d_row, max_col, max_row);
        self.select_cell(next);
    }

    /// Extend the selection by a delta from its moving corner.
    pub fn extend_by(&mut self, d_col: isize, d_row: isize, max_col: usize, max_row: usize) {
        let current = self.cursor().unwrap_or_default();
        let next = offset_clamped(current, d_col, d_row, max_col, max_row);
        self.extend_to(next);
    }

    /// The moving corner of the selection: the corner opposite the origin.
    pub fn cursor(&self) -> Option<Point> {
        let range = self.range?;
        let origin = self.origin.unwrap_or_else(|| range.top_left());
        let col = if origin.col == range.start_col { range.end_col } else { range.start_col };
        let row = if origin.row == range.start_row { range.end_row } else { range.start_row };
        Some(Point::new(col, row))
    }
}

fn offset_clamped(p: Point, d_col: isize, d_row: isize, max_col: usize, max_row: usize) -> Point {
    let col = (p.col as isize + d_col).clamp(0, max_col as isize - 1) as usize;
    let row = (p.row as isize + d_row).clamp(0, max_row as isize - 1) as usize;
    Point::new(col, row)
}
