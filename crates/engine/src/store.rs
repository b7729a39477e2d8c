//! The grid editor's state: sheet, selection and clipboard under one owner.
//!
//! Every operation runs to completion before returning. Mutations return
//! the events they produced and deliver them to subscribers.

use gridpad_core::{Point, Range, SelectionTracker};

use crate::cell::{Cell, CellPatch};
use crate::clipboard::{Clipboard, PasteLayout};
use crate::events::{EventCallback, SheetEvent};
use crate::sheet::{Sheet, COLUMNS, ROWS};
use crate::validation::{self, ValidationError};

#[derive(Default)]
pub struct Store {
    sheet: Sheet,
    selection: SelectionTracker,
    clipboard: Clipboard,
    paste_layout: PasteLayout,
    subscribers: Vec<EventCallback>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paste_layout(paste_layout: PasteLayout) -> Self {
        Self {
            paste_layout,
            ..Self::default()
        }
    }

    pub fn paste_layout(&self) -> PasteLayout {
        self.paste_layout
    }

    /// Register a callback that sees every event from now on.
    pub fn subscribe(&mut self, callback: EventCallback) {
        self.subscribers.push(callback);
    }

    fn emit(&mut self, event: SheetEvent) -> SheetEvent {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
        event
    }

    // =========================================================================
    // Cells
    // =========================================================================

    /// Reset every cell to the default record. Selection and clipboard are kept.
    pub fn initialize(&mut self) -> SheetEvent {
        log::debug!("resetting {}x{} grid", COLUMNS, ROWS);
        self.sheet.initialize();
        self.emit(SheetEvent::GridReset)
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// The cell at (col, row). Panics when out of range.
    pub fn cell(&self, col: usize, row: usize) -> &Cell {
        self.sheet.cell(col, row)
    }

    pub fn try_cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.sheet.try_cell(col, row)
    }

    /// Merge `patch` over the cell. No validation. Panics when out of range.
    pub fn update_cell(&mut self, col: usize, row: usize, patch: CellPatch) -> SheetEvent {
        let changed = self.sheet.update_cell(col, row, patch);
        log::trace!("update ({}, {}) changed={}", col, row, changed);
        self.emit(SheetEvent::CellChanged(Point::new(col, row)))
    }

    /// Like `update_cell`, but refuses values the cell's format can't display.
    /// The cell is untouched on error.
    pub fn update_cell_checked(
        &mut self,
        col: usize,
        row: usize,
        patch: CellPatch,
    ) -> Result<SheetEvent, ValidationError> {
        let merged = self.sheet.cell(col, row).merged(&patch);
        validation::validate_cell(col, row, &merged)?;
        Ok(self.update_cell(col, row, patch))
    }

    /// Apply `patch` to every selected cell, as the format/alignment/size
    /// controls do.
    pub fn update_selection(&mut self, patch: CellPatch) -> Vec<SheetEvent> {
        self.selection
            .cells()
            .into_iter()
            .map(|p| self.update_cell(p.col, p.row, patch.clone()))
            .collect()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn selected_range(&self) -> Option<Range> {
        self.selection.range()
    }

    /// Selected coordinates, column-major.
    pub fn selected_cells(&self) -> Vec<Point> {
        self.selection.cells()
    }

    pub fn start_selection(&mut self, p: Point) -> SheetEvent {
        self.selection.start_selection(p);
        self.emit(SheetEvent::SelectionChanged(self.selection.range()))
    }

    /// None when no drag is in progress.
    pub fn extend_selection(&mut self, p: Point) -> Option<SheetEvent> {
        if !self.selection.extend_selection(p) {
            return None;
        }
        Some(self.emit(SheetEvent::SelectionChanged(self.selection.range())))
    }

    pub fn end_selection(&mut self) {
        self.selection.end_selection();
    }

    pub fn select_cell(&mut self, p: Point) -> SheetEvent {
        self.selection.select_cell(p);
        self.emit(SheetEvent::SelectionChanged(self.selection.range()))
    }

    pub fn extend_to(&mut self, p: Point) -> SheetEvent {
        self.selection.extend_to(p);
        self.emit(SheetEvent::SelectionChanged(self.selection.range()))
    }

    pub fn move_by(&mut self, d_col: isize, d_row: isize) -> SheetEvent {
        self.selection.move_by(d_col, d_row, COLUMNS, ROWS);
        self.emit(SheetEvent::SelectionChanged(self.selection.range()))
    }

    pub fn extend_by(&mut self, d_col: isize, d_row: isize) -> SheetEvent {
        self.selection.extend_by(d_col, d_row, COLUMNS, ROWS);
        self.emit(SheetEvent::SelectionChanged(self.selection.range()))
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn has_clipboard(&self) -> bool {
        self.clipboard.has_content()
    }

    /// Snapshot the cells of `selection`, replacing the previous snapshot.
    pub fn copy(&mut self, selection: Option<Range>) -> SheetEvent {
        let len = self.clipboard.copy(&self.sheet, selection);
        log::debug!("copied {} cell(s) from {:?}", len, selection);
        self.emit(SheetEvent::ClipboardChanged { len })
    }

    pub fn copy_selection(&mut self) -> SheetEvent {
        self.copy(self.selection.range())
    }

    /// Write the snapshot starting at `anchor` using the configured layout.
    /// Off-grid destinations are skipped. Does nothing before the first copy.
    pub fn paste(&mut self, anchor: Point) -> Vec<SheetEvent> {
        let targets = self.clipboard.paste_targets(anchor, self.paste_layout);
        log::debug!(
            "pasting {} cell(s) at {:?} ({:?})",
            targets.len(),
            anchor,
            self.paste_layout
        );
        targets
            .into_iter()
            .map(|(p, cell)| self.update_cell(p.col, p.row, CellPatch::from(cell)))
            .collect()
    }

    /// Paste at the selection's first cell. Does nothing without a selection.
    pub fn paste_selection(&mut self) -> Vec<SheetEvent> {
        match self.selection.anchor() {
            Some(anchor) => self.paste(anchor),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::cell::FormatKind;
    use crate::events::EventCollector;

    fn collecting_store() -> (Store, Rc<RefCell<EventCollector>>) {
        let mut store = Store::new();
        let collector = Rc::new(RefCell::new(EventCollector::new()));
        let sink = Rc::clone(&collector);
        store.subscribe(Box::new(move |e| sink.borrow_mut().push(e.clone())));
        (store, collector)
    }

    #[test]
    fn test_update_notifies_subscribers() {
        let (mut store, events) = collecting_store();
        let returned = store.update_cell(2, 3, CellPatch::new().value("x"));

        assert_eq!(returned, SheetEvent::CellChanged(Point::new(2, 3)));
        assert_eq!(events.borrow().events(), &[returned]);
    }

    #[test]
    fn test_checked_update_rejects_and_leaves_cell() {
        let mut store = Store::new();
        store.update_cell(0, 0, CellPatch::new().value("abc"));

        let err = store
            .update_cell_checked(0, 0, CellPatch::new().format(FormatKind::Number))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NotANumber { col: 0, row: 0, .. }));
        assert_eq!(store.cell(0, 0).format, FormatKind::Text);

        assert!(store
            .update_cell_checked(0, 0, CellPatch::new().value("12").format(FormatKind::Number))
            .is_ok());
        assert_eq!(store.cell(0, 0).display(), "12");
    }

    #[test]
    fn test_update_selection_touches_every_selected_cell() {
        let (mut store, events) = collecting_store();
        store.start_selection(Point::new(1, 1));
        store.extend_selection(Point::new(2, 2));
        store.end_selection();
        events.borrow_mut().clear();

        store.update_selection(CellPatch::new().format(FormatKind::Currency));
        assert_eq!(
            events.borrow().cells_changed(),
            vec![Point::new(1, 1), Point::new(1, 2), Point::new(2, 1), Point::new(2, 2)]
        );
        assert_eq!(store.cell(2, 2).format, FormatKind::Currency);
        assert_eq!(store.cell(3, 3).format, FormatKind::Text);
    }

    #[test]
    fn test_extend_outside_drag_emits_nothing() {
        let (mut store, events) = collecting_store();
        assert!(store.extend_selection(Point::new(3, 3)).is_none());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_paste_emits_per_written_cell() {
        let (mut store, events) = collecting_store();
        store.update_cell(0, 0, CellPatch::new().value("a"));
        store.update_cell(0, 1, CellPatch::new().value("b"));
        store.copy(Some(Range::new(Point::new(0, 0), Point::new(0, 1))));
        events.borrow_mut().clear();

        // Reflow puts index 1 at column 26, which is off the grid
        let written = store.paste(Point::new(25, 0));
        assert_eq!(written, vec![SheetEvent::CellChanged(Point::new(25, 0))]);
        assert_eq!(events.borrow().cells_changed(), vec![Point::new(25, 0)]);
        assert_eq!(store.cell(25, 0).value, "a");
    }

    #[test]
    fn test_initialize_keeps_selection_and_clipboard() {
        let mut store = Store::new();
        store.update_cell(4, 4, CellPatch::new().value("v"));
        store.select_cell(Point::new(4, 4));
        store.copy_selection();

        assert_eq!(store.initialize(), SheetEvent::GridReset);
        assert!(store.cell(4, 4).is_default());
        assert_eq!(store.selected_cells(), vec![Point::new(4, 4)]);
        assert!(store.has_clipboard());
    }

    #[test]
    fn test_paste_selection_uses_anchor() {
        let mut store = Store::new();
        store.update_cell(0, 0, CellPatch::new().value("v"));
        store.select_cell(Point::new(0, 0));
        store.copy_selection();

        assert!(Store::new().paste_selection().is_empty());

        store.start_selection(Point::new(5, 9));
        store.extend_selection(Point::new(3, 7));
        store.end_selection();
        store.paste_selection();
        assert_eq!(store.cell(3, 7).value, "v");
    }
}
