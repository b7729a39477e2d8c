pub mod cell;
pub mod clipboard;
pub mod events;
pub mod format;
pub mod sheet;
pub mod store;
pub mod validation;

pub use cell::{Alignment, Cell, CellPatch, FormatKind, DEFAULT_FONT_SIZE};
pub use clipboard::PasteLayout;
pub use events::SheetEvent;
pub use sheet::{Sheet, COLUMNS, ROWS};
pub use store::Store;
