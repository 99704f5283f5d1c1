//! Type definitions for the FaceSwap Studio GUI.

use std::{path::PathBuf, time::Duration};

use egui::TextureHandle;
use faceswap_core::FaceSwapPipeline;
use faceswap_utils::{AppSettings, QualityLevel};
use image::RgbImage;

/// Which of the two input pickers an action refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Source,
    Target,
}

impl InputKind {
    pub fn title(self) -> &'static str {
        match self {
            InputKind::Source => "Source face",
            InputKind::Target => "Target image",
        }
    }
}

/// A decoded input image plus its lazily uploaded preview texture.
pub struct InputImage {
    pub path: PathBuf,
    pub image: RgbImage,
    pub texture: Option<TextureHandle>,
}

impl InputImage {
    pub fn new(path: PathBuf, image: RgbImage) -> Self {
        Self {
            path,
            image,
            texture: None,
        }
    }
}

/// The most recent successful swap.
pub struct SwapResult {
    pub image: RgbImage,
    pub quality: QualityLevel,
    pub swapped_faces: usize,
    pub elapsed: Duration,
    /// Quality-prefixed file name proposed by the save dialog.
    pub suggested_path: PathBuf,
    /// Where the result was last written, if it has been saved.
    pub saved_to: Option<PathBuf>,
    pub texture: Option<TextureHandle>,
}

/// The main application state for the FaceSwap Studio GUI.
pub struct FaceSwapApp {
    /// User-configurable settings.
    pub settings: AppSettings,
    /// Path to the settings file on disk.
    pub settings_path: PathBuf,
    /// The current status message displayed in the top bar.
    pub status_line: String,
    /// The last error message, if any.
    pub last_error: Option<String>,
    /// Loaded models, or `None` when they could not be loaded.
    pub pipeline: Option<FaceSwapPipeline>,
    pub source: Option<InputImage>,
    pub target: Option<InputImage>,
    pub result: Option<SwapResult>,
    /// Editable copy of the models directory shown in the settings panel.
    pub models_dir_input: String,
    /// Monotonic counter used to give each uploaded texture a unique name.
    pub texture_seq: u64,
}
