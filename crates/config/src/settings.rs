// Application settings
// Loaded from ~/.config/gridpad/settings.json

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use gridpad_engine::PasteLayout;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG: &str = r#"{
    // Grid appearance (width of each column in terminal cells)
    "grid.columnWidth": 12,

    // Clipboard
    // "reflow" lays pasted cells out in rows the full grid width wide;
    // "rectangle" keeps the shape of the copied block
    "clipboard.pasteLayout": "reflow",

    // Editing: refuse values the cell's format can't display
    "editor.validateOnWrite": false,

    // UI elements
    "ui.mouse": true,
    "ui.showStatusBar": true
}
"#;

#[derive(Debug)]
pub enum SettingsError {
    /// Settings file exists but couldn't be read.
    Io { path: PathBuf, message: String },
    /// Settings file isn't valid settings JSON.
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "cannot read {}: {message}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "cannot parse {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for SettingsError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Grid
    #[serde(rename = "grid.columnWidth")]
    pub column_width: u16,

    // Clipboard
    #[serde(rename = "clipboard.pasteLayout")]
    pub paste_layout: PasteLayout,

    // Editor
    #[serde(rename = "editor.validateOnWrite")]
    pub validate_on_write: bool,

    // UI
    #[serde(rename = "ui.mouse")]
    pub mouse: bool,

    #[serde(rename = "ui.showStatusBar")]
    pub show_status_bar: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            column_width: 12,
            paste_layout: PasteLayout::Reflow,
            validate_on_write: false,
            mouse: true,
            show_status_bar: true,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridpad");
        config_dir.join("settings.json")
    }

    /// Parse settings text. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Load settings from `path`. A missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut settings = Self::parse(&contents).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if settings.column_width < 3 {
            log::warn!(
                "grid.columnWidth {} is too narrow, using 3",
                settings.column_width
            );
            settings.column_width = 3;
        }

        Ok(settings)
    }

    /// Load from the default location, writing a commented default file the
    /// first time. Any error falls back to defaults with a warning.
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            Self::create_default_file(&path);
            return Self::default();
        }

        Self::load_or_default(&path)
    }

    /// Load from `path`, falling back to defaults with a warning on error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Save current settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }
}
