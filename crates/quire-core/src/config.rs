//! Editor settings and their JSON persistence.

use crate::guides::GuideFamilies;
use crate::snap::ANGLE_SNAP_INCREMENT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Alignment-guide snapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// Snap distance in screen units; zero or less disables guide snapping.
    pub snap_distance: f64,
    pub guides: GuideFamilies,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            snap_distance: 8.0,
            guides: GuideFamilies::default(),
        }
    }
}

/// Settings consumed by the transform engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub snap: SnapSettings,
    /// Minimum width/height enforced while resizing.
    pub min_item_size: f64,
    /// Handle hit radius in screen units.
    pub handle_tolerance: f64,
    /// Increment for shift-constrained rotation and line angles.
    pub rotate_snap_degrees: f64,
    /// Maximum undo steps, 0 = unlimited.
    pub undo_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snap: SnapSettings::default(),
            min_item_size: 10.0,
            handle_tolerance: 8.0,
            rotate_snap_degrees: ANGLE_SNAP_INCREMENT,
            undo_limit: 0,
        }
    }
}

impl Settings {
    /// `~/.quire/settings.json`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".quire").join("settings.json"))
    }

    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            SettingsError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let settings = serde_json::from_str(&json).map_err(|e| {
            SettingsError::Parse(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SettingsError::Parse(e.to_string()))?;
        fs::write(path, json).map_err(|e| {
            SettingsError::Io(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}
