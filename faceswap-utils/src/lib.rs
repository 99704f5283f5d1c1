//! Common helpers shared across the FaceSwap Studio crates.

/// Color-space conversions (HSV, CIE Lab).
pub mod color;
/// Application configuration and settings management.
pub mod config;
/// Post-swap enhancement filters (skin smoothing, color correction, tone mapping).
pub mod enhance;
/// Test fixture and model directory resolution.
pub mod fixtures;
/// Image loading, resizing, and tensor conversion.
pub mod image_utils;
/// Result encoding and file naming.
pub mod output;
/// Output quality presets.
pub mod quality;
/// Instrumentation helpers for optional performance tracing.
pub mod telemetry;

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::LevelFilter;

pub use config::{AppSettings, FaceSelection, default_settings_path};
pub use enhance::{
    EnhanceContext, EnhancementSettings, FaceRegion, enhance, enhance_for_quality,
};
pub use fixtures::{fixture_path, fixtures_dir, load_fixture_image, models_dir};
pub use image_utils::{
    channel_means, compute_resize_scales, load_image, load_rgb_image, resize_image,
    rgb_to_bgr_chw, rgb_to_normalized_nchw,
};
pub use output::{ImageFormatHint, OutputOptions, result_file_name, result_path, save_rgb_image};
pub use quality::QualityLevel;
pub use telemetry::{
    TELEMETRY_TARGET, TimingGuard, configure as configure_telemetry, telemetry_allows,
    telemetry_enabled, timing_guard,
};

/// Initialize logging once for CLI and GUI environments.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies. Telemetry records are always
/// let through so [`configure_telemetry`] alone decides whether they appear.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.filter_module(TELEMETRY_TARGET, LevelFilter::Trace);

    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
    Ok(())
}

/// Validate that a path exists and resolve it to an absolute path.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    anyhow::ensure!(path.exists(), "path does not exist: {}", path.display());
    Ok(path.canonicalize()?)
}
