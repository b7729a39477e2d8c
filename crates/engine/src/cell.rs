use std::fmt;

use serde::{Deserialize, Serialize};

/// Font size every cell starts with.
pub const DEFAULT_FONT_SIZE: u32 = 11;

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub const ALL: [Alignment; 3] = [Alignment::Left, Alignment::Center, Alignment::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }

    /// Parse a toolbar name. Unknown names fall back to left.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "center" => Alignment::Center,
            "right" => Alignment::Right,
            _ => Alignment::Left,
        }
    }

    /// Next alignment in toolbar order, wrapping around.
    pub fn cycle(&self) -> Self {
        match self {
            Alignment::Left => Alignment::Center,
            Alignment::Center => Alignment::Right,
            Alignment::Right => Alignment::Left,
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display format for a cell's value. Controls display only, never storage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    #[default]
    Text,
    Number,
    Currency,
    Percentage,
    Date,
}

impl FormatKind {
    pub const ALL: [FormatKind; 5] = [
        FormatKind::Text,
        FormatKind::Number,
        FormatKind::Currency,
        FormatKind::Percentage,
        FormatKind::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Text => "text",
            FormatKind::Number => "number",
            FormatKind::Currency => "currency",
            FormatKind::Percentage => "percentage",
            FormatKind::Date => "date",
        }
    }

    /// Parse a toolbar name. Anything unrecognized displays as text.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "number" => FormatKind::Number,
            "currency" => FormatKind::Currency,
            "percentage" => FormatKind::Percentage,
            "date" => FormatKind::Date,
            _ => FormatKind::Text,
        }
    }

    /// Step through `ALL` by `delta`, wrapping at both ends.
    pub fn cycle(&self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let idx = Self::ALL.iter().position(|k| k == self).unwrap_or(0) as isize;
        Self::ALL[(idx + delta).rem_euclid(len) as usize]
    }

    /// Whether this format reads the value as a number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FormatKind::Number | FormatKind::Currency | FormatKind::Percentage)
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One grid position: the raw value plus its display attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub value: String,
    pub format: FormatKind,
    pub alignment: Alignment,
    pub font_size: u32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            value: String::new(),
            format: FormatKind::Text,
            alignment: Alignment::Left,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl Cell {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// The value as it should appear on screen.
    pub fn display(&self) -> String {
        crate::format::format_value(&self.value, self.format)
    }

    /// Copy of this cell with `patch` merged over it.
    pub fn merged(&self, patch: &CellPatch) -> Cell {
        let mut cell = self.clone();
        patch.clone().apply_to(&mut cell);
        cell
    }
}

/// Partial cell update. `None` fields keep the cell's current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellPatch {
    pub value: Option<String>,
    pub format: Option<FormatKind>,
    pub alignment: Option<Alignment>,
    pub font_size: Option<u32>,
}

impl CellPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn format(mut self, format: FormatKind) -> Self {
        self.format = Some(format);
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn font_size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.format.is_none()
            && self.alignment.is_none()
            && self.font_size.is_none()
    }

    /// Shallow field overwrite. Returns whether the cell actually changed.
    pub fn apply_to(self, cell: &mut Cell) -> bool {
        let before = cell.clone();
        if let Some(value) = self.value {
            cell.value = value;
        }
        if let Some(format) = self.format {
            cell.format = format;
        }
        if let Some(alignment) = self.alignment {
            cell.alignment = alignment;
        }
        if let Some(font_size) = self.font_size {
            cell.font_size = font_size;
        }
        *cell != before
    }
}

/// A full cell as a patch: every field overwrites.
impl From<Cell> for CellPatch {
    fn from(cell: Cell) -> Self {
        Self {
            value: Some(cell.value),
            format: Some(cell.format),
            alignment: Some(cell.alignment),
            font_size: Some(cell.font_size),
        }
    }
}
