//! Settings persistence for the GUI.

use std::path::Path;

use anyhow::{Context as AnyhowContext, Result};
use faceswap_utils::AppSettings;
use log::warn;

/// Load settings from `path`. A missing file yields defaults silently; an unreadable one
/// yields defaults with a warning.
pub fn load_settings(path: &Path) -> AppSettings {
    if !path.exists() {
        return AppSettings::default();
    }
    AppSettings::load_from_path(path).unwrap_or_else(|err| {
        warn!(
            "Failed to load settings from {}: {err:#}. Falling back to defaults.",
            path.display()
        );
        AppSettings::default()
    })
}

/// Write `settings` to `settings_path` as JSON.
pub fn persist_settings(settings: &AppSettings, settings_path: &Path) -> Result<()> {
    settings
        .save_to_path(settings_path)
        .with_context(|| format!("failed to write settings to {}", settings_path.display()))
}

/// Like [`persist_settings`], but reduces the error to a message for the status bar.
pub fn persist_settings_with_feedback(
    settings: &AppSettings,
    settings_path: &Path,
) -> Result<(), String> {
    persist_settings(settings, settings_path).map_err(|err| {
        let message = format!("Failed to save settings: {err:#}");
        warn!("{message}");
        message
    })
}
