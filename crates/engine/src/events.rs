//! Change notifications.
//!
//! The store never draws anything. Each mutating operation returns the events
//! it produced and also hands them to every subscriber, so a front end can
//! either redraw from the return value or register a callback once.

use gridpad_core::{Point, Range};

/// Something about the store changed and anything showing it is stale.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent {
    /// Every cell went back to the default record.
    GridReset,

    /// One cell was written. Emitted for every write, even one that left the
    /// cell as it was.
    CellChanged(Point),

    /// The selection rectangle was recomputed.
    SelectionChanged(Option<Range>),

    /// The clipboard snapshot was replaced.
    ClipboardChanged { len: usize },
}

/// Callback type for receiving store events.
pub type EventCallback = Box<dyn FnMut(&SheetEvent)>;

/// Simple event collector for testing.
#[derive(Default)]
pub struct EventCollector {
    events: Vec<SheetEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: SheetEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SheetEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Cells named by CellChanged events, in order.
    pub fn cells_changed(&self) -> Vec<Point> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SheetEvent::CellChanged(p) => Some(*p),
                _ => None,
            })
            .collect()
    }
}
