//! Settings persistence
//!
//! Saves and loads [`LessonSettings`] to/from a JSON file in the user's
//! configuration directory.
//!
//! # Error Handling
//!
//! [`load_settings`] never fails: a missing, unreadable, unparseable or invalid
//! file is logged and replaced by defaults. The `*_from`/`*_to` variants return
//! the underlying [`CoreError`] for callers (and tests) that want it.

use crate::core::error::CoreResult;
use crate::core::settings::LessonSettings;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "lesson_settings.json";

/// Helper to resolve the settings file path
///
/// Returns a path to `lesson_settings.json` in the user's configuration
/// directory, falling back to the current directory if none can be found.
pub fn get_settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "XFChess") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Load settings from the default location, falling back to defaults
pub fn load_settings() -> LessonSettings {
    let settings_path = get_settings_path();

    if !settings_path.exists() {
        info!(
            "[SETTINGS] No settings file found at {:?}. Using defaults.",
            settings_path
        );
        return LessonSettings::default();
    }

    match load_settings_from(&settings_path) {
        Ok(settings) => {
            info!("[SETTINGS] Loaded settings from {:?}", settings_path);
            settings
        }
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to load settings file at {:?}: {}. Using defaults.",
                settings_path, e
            );
            LessonSettings::default()
        }
    }
}

/// Read and validate a settings file
pub fn load_settings_from(path: &Path) -> CoreResult<LessonSettings> {
    let contents = fs::read_to_string(path)?;
    let settings: LessonSettings = serde_json::from_str(&contents)?;
    settings.validate()?;
    Ok(settings)
}

/// Save settings to the default location
///
/// Failures are logged and returned; they never interrupt a lesson.
pub fn save_settings(settings: &LessonSettings) -> CoreResult<()> {
    let settings_path = get_settings_path();
    save_settings_to(&settings_path, settings).inspect_err(|e| {
        error!(
            "[SETTINGS] Failed to save settings at {:?}: {}",
            settings_path, e
        );
    })
}

/// Write settings as pretty JSON, creating the parent directory if needed
pub fn save_settings_to(path: &Path, settings: &LessonSettings) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}
