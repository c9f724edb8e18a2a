//! Persisted canvas configuration.

use crate::canvas::{CreateMode, DEFAULT_CANVAS_SIZE, DEFAULT_LINE_DETAIL, EditMode};
use crate::eraser::{DEFAULT_ERASER_RADIUS, EraseMode, EraserShape};
use crate::path::{
    DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, DashStyle, SerializableColor, SimilarityPolicy,
};
use crate::snap::{DEFAULT_GRID_DIMENSION, DEFAULT_SNAP_DISTANCE, SnapOptions};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings persistence errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

/// Result type for settings persistence.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Initial canvas values, loaded at startup and saved on shutdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub snap_distance: f64,
    pub line_detail: f64,
    pub grid_dimension: u32,
    pub eraser_radius: f64,
    pub stroke_width: f64,
    pub stroke_color: SerializableColor,
    pub canvas_size: Size,
    pub show_grid: bool,
    pub auto_unify: bool,
    pub show_points: bool,
    pub show_size_indicator: bool,
    pub snap_options: SnapOptions,
    pub eraser_shape: EraserShape,
    pub edit_mode: EditMode,
    pub erase_mode: EraseMode,
    pub dash_style: DashStyle,
    pub create_mode: CreateMode,
    pub similarity: SimilarityPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snap_distance: DEFAULT_SNAP_DISTANCE,
            line_detail: DEFAULT_LINE_DETAIL,
            grid_dimension: DEFAULT_GRID_DIMENSION,
            eraser_radius: DEFAULT_ERASER_RADIUS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_color: DEFAULT_STROKE_COLOR,
            canvas_size: DEFAULT_CANVAS_SIZE,
            show_grid: false,
            auto_unify: false,
            show_points: false,
            show_size_indicator: false,
            snap_options: SnapOptions::NONE,
            eraser_shape: EraserShape::Circle,
            edit_mode: EditMode::Disabled,
            erase_mode: EraseMode::Point,
            dash_style: DashStyle::Solid,
            create_mode: CreateMode::FreeForm,
            similarity: SimilarityPolicy::MatchColor,
        }
    }
}

impl Settings {
    /// Default settings file location.
    ///
    /// On Linux: `~/.config/blueprintboard/settings.json`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let base = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(base.join("blueprintboard").join("settings.json"))
    }

    pub fn load(path: &Path) -> SettingsResult<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| SettingsError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&json).map_err(|e| {
            SettingsError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load settings, falling back to defaults when the file is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Write settings, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SettingsError::Serialization(e.to_string()))?;
        fs::write(path, json)
            .map_err(|e| SettingsError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("nested").join("settings.json");
        let settings = Settings {
            snap_distance: 15.0,
            show_grid: true,
            snap_options: SnapOptions::ALL,
            eraser_shape: EraserShape::Square,
            stroke_color: SerializableColor::rgb(1, 2, 3),
            ..Settings::default()
        };

        settings.save(&file).unwrap();
        assert_eq!(Settings::load(&file).unwrap(), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"show_grid": true}"#).unwrap();
        assert!(settings.show_grid);
        assert_eq!(settings.grid_dimension, 70);
        assert_eq!(settings.snap_distance, 10.0);
        assert_eq!(settings.create_mode, CreateMode::FreeForm);
    }

    #[test]
    fn test_load_or_default() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        assert_eq!(Settings::load_or_default(&missing), Settings::default());

        let broken = temp_dir.path().join("broken.json");
        fs::write(&broken, "{ nope").unwrap();
        assert_eq!(Settings::load_or_default(&broken), Settings::default());
        assert!(matches!(
            Settings::load(&broken),
            Err(SettingsError::Serialization(_))
        ));
    }
}
