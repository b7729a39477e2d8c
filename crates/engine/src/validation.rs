//! Opt-in write-time validation.
//!
//! `Sheet::update_cell` accepts any value for any format and lets the
//! formatter show `NaN` / `Invalid Date`. `Store::update_cell_checked` runs
//! the merged cell through `validate_cell` first and refuses the write
//! instead. Empty values and text cells are always valid.

use std::fmt;

use crate::cell::{Cell, FormatKind};
use crate::format;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Number, currency or percentage cell whose value isn't a number.
    NotANumber { col: usize, row: usize, value: String },
    /// Date cell whose value isn't a date.
    NotADate { col: usize, row: usize, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber { col, row, value } => {
                write!(f, "cell ({col}, {row}): '{value}' is not a number")
            }
            Self::NotADate { col, row, value } => {
                write!(f, "cell ({col}, {row}): '{value}' is not a date")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check that `cell`'s value can be displayed in its format.
pub fn validate_cell(col: usize, row: usize, cell: &Cell) -> Result<(), ValidationError> {
    if cell.value.is_empty() {
        return Ok(());
    }

    match cell.format {
        kind if kind.is_numeric() => {
            if format::to_number(&cell.value).is_nan() {
                return Err(ValidationError::NotANumber {
                    col,
                    row,
                    value: cell.value.clone(),
                });
            }
        }
        FormatKind::Date => {
            if format::parse_date(&cell.value).is_none() {
                return Err(ValidationError::NotADate {
                    col,
                    row,
                    value: cell.value.clone(),
                });
            }
        }
        _ => {}
    }

    Ok(())
}
