//! Locate the shared `fixtures/` directory used by tests across the workspace.

use anyhow::{Context, Result};
use image::RgbImage;
use std::{
    env,
    path::{Path, PathBuf},
};

const FIXTURE_ENV: &str = "FACESWAP_FIXTURE_ROOT";
const MODELS_ENV: &str = "FACESWAP_MODELS_DIR";

/// Resolve the fixture root: `FACESWAP_FIXTURE_ROOT` if set, otherwise the nearest `fixtures`
/// directory above this crate's manifest.
pub fn fixtures_dir() -> Result<PathBuf> {
    if let Ok(value) = env::var(FIXTURE_ENV) {
        return Ok(PathBuf::from(value));
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .map(|ancestor| ancestor.join("fixtures"))
        .find(|candidate| candidate.is_dir())
        .with_context(|| {
            format!(
                "fixtures directory not found starting from {}",
                manifest_dir.display()
            )
        })
}

/// Resolve a path inside the fixture folder, failing if it does not exist.
pub fn fixture_path<P: AsRef<Path>>(relative: P) -> Result<PathBuf> {
    let relative = relative.as_ref();
    let root = fixtures_dir()?;
    let full = root.join(relative);
    anyhow::ensure!(
        full.exists(),
        "fixture {} does not exist under {}",
        relative.display(),
        root.display()
    );
    Ok(full)
}

/// Load a fixture image as RGB.
pub fn load_fixture_image<P: AsRef<Path>>(relative: P) -> Result<RgbImage> {
    let path = fixture_path(relative)?;
    let image = image::open(&path)
        .with_context(|| format!("failed to open fixture image {}", path.display()))?;
    Ok(image.to_rgb8())
}

/// Directory holding the pretrained models for model-backed tests.
///
/// Uses `FACESWAP_MODELS_DIR` when set, otherwise the nearest `models` directory above this
/// crate. Returns `None` unless all three default model files are present, so callers can
/// skip.
pub fn models_dir() -> Option<PathBuf> {
    let candidate = match env::var(MODELS_ENV) {
        Ok(value) => PathBuf::from(value),
        Err(_) => PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .ancestors()
            .map(|ancestor| ancestor.join("models"))
            .find(|dir| dir.is_dir())?,
    };
    let complete = [
        crate::config::DEFAULT_DETECTOR_MODEL,
        crate::config::DEFAULT_RECOGNIZER_MODEL,
        crate::config::DEFAULT_SWAPPER_MODEL,
    ]
    .iter()
    .all(|name| candidate.join(name).is_file());
    complete.then_some(candidate)
}
