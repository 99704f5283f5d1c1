//! Configuration loading and CLI override logic.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use faceswap_utils::{AppSettings, QualityLevel, default_settings_path, normalize_path, result_path};
use log::info;

use crate::args::SwapArgs;

/// Load application settings from a file, the default location, or built-in defaults.
pub fn load_settings(config_path: Option<&PathBuf>) -> Result<AppSettings> {
    if let Some(path) = config_path {
        let resolved = normalize_path(path)?;
        let settings = AppSettings::load_from_path(&resolved)?;
        info!("Loaded settings from {}", resolved.display());
        return Ok(settings);
    }

    let default_path = default_settings_path();
    if default_path.exists() {
        let settings = AppSettings::load_from_path(&default_path).with_context(|| {
            format!(
                "failed to load default settings from {}",
                default_path.display()
            )
        })?;
        info!("Loaded settings from {}", default_path.display());
        Ok(settings)
    } else {
        Ok(AppSettings::default())
    }
}

/// Apply command-line arguments on top of loaded or default settings.
pub fn apply_cli_overrides(settings: &mut AppSettings, args: &SwapArgs) {
    if let Some(dir) = args.models_dir.as_ref() {
        settings.models.directory = dir.clone();
    }
    if let Some(name) = args.detector_model.as_ref() {
        settings.models.detector = name.clone();
    }
    if let Some(name) = args.recognizer_model.as_ref() {
        settings.models.recognizer = name.clone();
    }
    if let Some(name) = args.swapper_model.as_ref() {
        settings.models.swapper = name.clone();
    }

    if let Some(quality) = args.quality {
        settings.quality = quality;
    }
    if let Some(dir) = args.output_dir.as_ref() {
        settings.output.directory = dir.clone();
    }
    if args.all_faces {
        settings.swap.swap_all_faces = true;
    }
    if let Some(selection) = args.face_selection {
        settings.swap.face_selection = selection;
    }
    if let Some(score) = args.score_threshold {
        settings.detection.score_threshold = score;
    }

    if args.telemetry {
        settings.telemetry.enabled = true;
    }
    if let Some(level) = args.telemetry_level.as_ref() {
        let normalized = level.trim().to_ascii_lowercase();
        if !normalized.is_empty() {
            if normalized == "off" {
                settings.telemetry.enabled = false;
            }
            settings.telemetry.level = normalized;
        }
    }

    settings.sanitize();
}

/// Where the result is written: the explicit `--output`, or the quality-prefixed name inside
/// the output directory.
pub fn resolve_output_path(
    explicit: Option<&Path>,
    output_dir: &Path,
    quality: QualityLevel,
    target: &Path,
    source: &Path,
) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => result_path(output_dir, quality, target, source),
    }
}
