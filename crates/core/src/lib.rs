//! Grid coordinates and the rectangular selection model.

pub mod selection;

pub use selection::{Point, Range, SelectionTracker};
