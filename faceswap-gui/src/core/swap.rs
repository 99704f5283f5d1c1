//! Model loading and swap requests.

use std::path::{Path, PathBuf};

use faceswap_core::{FaceSwapPipeline, ModelPaths, PipelineOptions, SwapError};
use faceswap_utils::{AppSettings, result_path, timing_guard};
use log::{info, warn};

use crate::types::{FaceSwapApp, InputImage, InputKind, SwapResult};

/// Load the three models named by `settings`.
pub fn build_pipeline(settings: &AppSettings) -> Result<FaceSwapPipeline, SwapError> {
    let paths = ModelPaths::from(&settings.models);
    let missing = paths.missing();
    if !missing.is_empty() {
        warn!(
            "Missing model file(s): {}",
            missing
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    FaceSwapPipeline::from_settings(settings)
}

impl FaceSwapApp {
    /// Decode `path` into the source or target slot. Clears any previous result.
    pub fn load_input(&mut self, kind: InputKind, path: PathBuf) {
        match faceswap_core::load_input(&path) {
            Ok(image) => {
                info!(
                    "Loaded {} {} ({}x{})",
                    kind.title().to_lowercase(),
                    path.display(),
                    image.width(),
                    image.height()
                );
                let slot = InputImage::new(path, image);
                match kind {
                    InputKind::Source => self.source = Some(slot),
                    InputKind::Target => self.target = Some(slot),
                }
                self.result = None;
                self.last_error = None;
                self.status_line = if self.can_swap() {
                    "Ready to swap.".to_owned()
                } else {
                    self.idle_status()
                };
            }
            Err(err) => self.show_error(err.user_message()),
        }
    }

    /// Whether both images are loaded and the models are available.
    pub fn can_swap(&self) -> bool {
        self.pipeline.is_some() && self.source.is_some() && self.target.is_some()
    }

    /// Run the swap synchronously at the configured quality.
    pub fn run_swap(&mut self) {
        if !self.can_swap() {
            let message = self.idle_status();
            self.show_error(message);
            return;
        }
        let (Some(pipeline), Some(source), Some(target)) =
            (self.pipeline.as_ref(), self.source.as_ref(), self.target.as_ref())
        else {
            return;
        };

        let quality = self.settings.quality;
        let _guard = timing_guard("faceswap_gui::swap_request", log::Level::Info);
        match pipeline.process(&source.image, &target.image, quality) {
            Ok(outcome) => {
                let suggested_path = result_path(
                    &self.settings.output.directory,
                    quality,
                    &target.path,
                    &source.path,
                );
                self.status_line = format!(
                    "Swapped {} face(s) at {} quality in {:.2?}.",
                    outcome.swapped_faces,
                    quality.as_label(),
                    outcome.elapsed
                );
                self.last_error = None;
                self.result = Some(SwapResult {
                    image: outcome.image,
                    quality,
                    swapped_faces: outcome.swapped_faces,
                    elapsed: outcome.elapsed,
                    suggested_path,
                    saved_to: None,
                    texture: None,
                });
            }
            Err(err) => {
                warn!("Swap failed: {err}");
                self.result = None;
                self.show_error(err.user_message());
            }
        }
    }

    /// Write the current result to `destination`.
    pub fn save_result_to(&mut self, destination: &Path) {
        let Some(result) = self.result.as_mut() else {
            self.show_error("There is no result to save yet.".to_owned());
            return;
        };
        let options = self.settings.output.options();
        match faceswap_core::save_result(&result.image, destination, &options) {
            Ok(_) => {
                result.saved_to = Some(destination.to_path_buf());
                self.last_error = None;
                self.status_line = format!("Saved result to {}", destination.display());
                info!("{}", self.status_line);
            }
            Err(err) => self.show_error(err.user_message()),
        }
    }

    /// Reload the models after the models directory changed.
    pub fn reload_pipeline(&mut self) {
        match build_pipeline(&self.settings) {
            Ok(pipeline) => {
                self.pipeline = Some(pipeline);
                self.last_error = None;
                self.status_line = self.idle_status();
            }
            Err(err) => {
                self.pipeline = None;
                self.show_error(err.user_message());
            }
        }
    }

    /// Push quality / selection changes into the loaded pipeline without reloading models.
    pub fn sync_pipeline_options(&mut self) {
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.set_options(PipelineOptions::from(&self.settings));
        }
    }

    pub(crate) fn idle_status(&self) -> String {
        if self.pipeline.is_none() {
            format!(
                "Models not loaded. Place them in {} and reload.",
                self.settings.models.directory.display()
            )
        } else if self.source.is_none() {
            "Choose the source face.".to_owned()
        } else if self.target.is_none() {
            "Choose the target image.".to_owned()
        } else {
            "Ready to swap.".to_owned()
        }
    }

    pub(crate) fn show_error(&mut self, message: String) {
        warn!("{message}");
        self.last_error = Some(message);
    }
}
