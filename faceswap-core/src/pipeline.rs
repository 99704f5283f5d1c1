//! The linear swap pipeline: load → detect → pick faces → swap → enhance → save.

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use faceswap_utils::{
    AppSettings, EnhanceContext, EnhancementSettings, FaceRegion, FaceSelection, ImageFormatHint,
    OutputOptions, QualityLevel, config::ModelSettings, enhance, load_rgb_image, save_rgb_image,
    timing_guard,
};
use image::RgbImage;
use log::{Level, debug, info, warn};

use crate::detector::{FaceDetector, YuNetDetector};
use crate::error::{ImageRole, SwapError};
use crate::postprocess::{Face, PostprocessConfig, select_face};
use crate::preprocess::InputSize;
use crate::recognizer::ArcFaceRecognizer;
use crate::swapper::{FaceSwapper, InSwapper};

/// Resolved locations of the three models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub detector: PathBuf,
    pub recognizer: PathBuf,
    pub swapper: PathBuf,
}

impl ModelPaths {
    /// Paths that do not exist on disk.
    pub fn missing(&self) -> Vec<&Path> {
        [&self.detector, &self.recognizer, &self.swapper]
            .into_iter()
            .map(PathBuf::as_path)
            .filter(|p| !p.exists())
            .collect()
    }
}

impl Default for ModelPaths {
    fn default() -> Self {
        (&ModelSettings::default()).into()
    }
}

impl From<&ModelSettings> for ModelPaths {
    fn from(settings: &ModelSettings) -> Self {
        Self {
            detector: settings.detector_path(),
            recognizer: settings.recognizer_path(),
            swapper: settings.swapper_path(),
        }
    }
}

/// Behaviour knobs that do not require reloading models.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineOptions {
    pub face_selection: FaceSelection,
    /// Render the source identity onto every usable target face instead of one.
    pub swap_all_faces: bool,
    pub output: OutputOptions,
}

impl From<&AppSettings> for PipelineOptions {
    fn from(settings: &AppSettings) -> Self {
        Self {
            face_selection: settings.swap.face_selection,
            swap_all_faces: settings.swap.swap_all_faces,
            output: settings.output.options(),
        }
    }
}

/// Result of one swap request.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub image: RgbImage,
    pub quality: QualityLevel,
    /// Every face detected in the source image, left to right.
    pub source_faces: Vec<Face>,
    /// Every face detected in the target image, left to right.
    pub target_faces: Vec<Face>,
    /// Number of target faces that received the source identity.
    pub swapped_faces: usize,
    pub elapsed: Duration,
}

/// Face swap pipeline over a detector and a swapper.
pub struct FaceSwapPipeline {
    detector: Box<dyn FaceDetector>,
    swapper: Box<dyn FaceSwapper>,
    options: PipelineOptions,
}

impl std::fmt::Debug for FaceSwapPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceSwapPipeline")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl FaceSwapPipeline {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        swapper: Box<dyn FaceSwapper>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            detector,
            swapper,
            options,
        }
    }

    /// Load the YuNet, ArcFace and inswapper models named by `settings`.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SwapError> {
        let paths = ModelPaths::from(&settings.models);
        Self::load(
            &paths,
            InputSize::from(&settings.input),
            PostprocessConfig::from(&settings.detection),
            PipelineOptions::from(settings),
        )
    }

    pub fn load(
        paths: &ModelPaths,
        input_size: InputSize,
        postprocess: PostprocessConfig,
        options: PipelineOptions,
    ) -> Result<Self, SwapError> {
        let _guard = timing_guard("faceswap_core::load_models", Level::Info);
        let detector = YuNetDetector::new(&paths.detector, input_size, postprocess)
            .map_err(|e| model_unavailable(&paths.detector, e))?;
        let recognizer = ArcFaceRecognizer::new(&paths.recognizer)
            .map_err(|e| model_unavailable(&paths.recognizer, e))?;
        let swapper = InSwapper::new(&paths.swapper, recognizer)
            .map_err(|e| model_unavailable(&paths.swapper, e))?;
        info!(
            "Loaded models from {}, {} and {}",
            paths.detector.display(),
            paths.recognizer.display(),
            paths.swapper.display()
        );
        Ok(Self::new(Box::new(detector), Box::new(swapper), options))
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: PipelineOptions) {
        self.options = options;
    }

    /// Swap the selected source face onto the target and enhance the result for `quality`.
    pub fn process(
        &self,
        source: &RgbImage,
        target: &RgbImage,
        quality: QualityLevel,
    ) -> Result<SwapOutcome, SwapError> {
        let started = Instant::now();
        ensure_pixels(source, ImageRole::Source)?;
        ensure_pixels(target, ImageRole::Target)?;

        let source_faces = self.detect(source, ImageRole::Source)?;
        let target_faces = self.detect(target, ImageRole::Target)?;

        let source_face = select_face(&source_faces, self.options.face_selection)
            .ok_or(SwapError::NoFaceDetected {
                role: ImageRole::Source,
            })?;
        if !source_face.is_usable() {
            return Err(SwapError::SwapFailed(
                "the source face has degenerate landmarks".into(),
            ));
        }
        let targets = self.faces_to_swap(&target_faces)?;

        let swapped = {
            let _guard = timing_guard("faceswap_core::swap", Level::Info);
            let identity = self
                .swapper
                .identity(source, source_face)
                .map_err(SwapError::swap_failed)?;
            let mut current = target.clone();
            for face in &targets {
                current = self
                    .swapper
                    .swap(&current, face, &identity)
                    .map_err(SwapError::swap_failed)?;
            }
            current
        };
        if swapped.dimensions() != target.dimensions() {
            return Err(SwapError::SwapFailed(format!(
                "swapper returned {}x{} for a {}x{} target",
                swapped.width(),
                swapped.height(),
                target.width(),
                target.height()
            )));
        }

        let image = {
            let _guard = timing_guard("faceswap_core::enhance", Level::Info);
            let (width, height) = target.dimensions();
            let regions: Vec<FaceRegion> = targets
                .iter()
                .filter_map(|f| f.bbox.region())
                .filter_map(|r| r.clamp_to(width, height))
                .collect();
            let mut settings = EnhancementSettings::for_quality(quality);
            // An empty region list means "whole image" to the smoother.
            if regions.is_empty() && settings.skin_smoothing.take().is_some() {
                warn!("Swapped faces lie outside the target image; skipping skin smoothing");
            }
            let ctx = EnhanceContext::from_images(source, target, regions);
            enhance(&swapped, &settings, &ctx)
        };

        let swapped_faces = targets.len();
        let outcome = SwapOutcome {
            image,
            quality,
            source_faces,
            target_faces,
            swapped_faces,
            elapsed: started.elapsed(),
        };
        info!(
            "Swapped {} of {} target face(s) at {} quality in {:.2?}",
            outcome.swapped_faces,
            outcome.target_faces.len(),
            quality.as_label(),
            outcome.elapsed
        );
        Ok(outcome)
    }

    /// Load both images from disk, then [`process`](Self::process) them.
    pub fn process_paths(
        &self,
        source_path: &Path,
        target_path: &Path,
        quality: QualityLevel,
    ) -> Result<SwapOutcome, SwapError> {
        let source = load_input(source_path)?;
        let target = load_input(target_path)?;
        self.process(&source, &target, quality)
    }

    /// Write `image` to `destination` with the configured encoder options.
    pub fn save(&self, image: &RgbImage, destination: &Path) -> Result<ImageFormatHint, SwapError> {
        save_result(image, destination, &self.options.output)
    }

    fn detect(&self, image: &RgbImage, role: ImageRole) -> Result<Vec<Face>, SwapError> {
        let _guard = timing_guard(format!("faceswap_core::detect_{role}"), Level::Info);
        let faces = self
            .detector
            .detect(image)
            .map_err(|e| SwapError::SwapFailed(format!("{role} face detection failed: {e:#}")))?;
        debug!("{} face(s) detected in the {role} image", faces.len());
        if faces.is_empty() {
            return Err(SwapError::NoFaceDetected { role });
        }
        Ok(faces)
    }

    fn faces_to_swap<'a>(&self, faces: &'a [Face]) -> Result<Vec<&'a Face>, SwapError> {
        if self.options.swap_all_faces {
            let usable: Vec<&Face> = faces.iter().filter(|f| f.is_usable()).collect();
            if usable.len() < faces.len() {
                warn!(
                    "Skipping {} target face(s) with degenerate landmarks",
                    faces.len() - usable.len()
                );
            }
            if usable.is_empty() {
                return Err(SwapError::SwapFailed(
                    "no target face has usable landmarks".into(),
                ));
            }
            return Ok(usable);
        }

        let face = select_face(faces, self.options.face_selection).ok_or(
            SwapError::NoFaceDetected {
                role: ImageRole::Target,
            },
        )?;
        if !face.is_usable() {
            return Err(SwapError::SwapFailed(
                "the target face has degenerate landmarks".into(),
            ));
        }
        Ok(vec![face])
    }
}

/// Decode an input image, mapping every failure to [`SwapError::UnsupportedFormat`].
pub fn load_input(path: &Path) -> Result<RgbImage, SwapError> {
    let _guard = timing_guard("faceswap_core::load_image", Level::Debug);
    load_rgb_image(path).map_err(|e| SwapError::UnsupportedFormat {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })
}

/// Encode and write a result image, mapping failures to [`SwapError::Output`].
pub fn save_result(
    image: &RgbImage,
    destination: &Path,
    options: &OutputOptions,
) -> Result<ImageFormatHint, SwapError> {
    let _guard = timing_guard("faceswap_core::save", Level::Info);
    save_rgb_image(image, destination, options).map_err(|e| SwapError::Output {
        path: destination.to_path_buf(),
        reason: format!("{e:#}"),
    })
}

fn ensure_pixels(image: &RgbImage, role: ImageRole) -> Result<(), SwapError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(SwapError::UnsupportedFormat {
            path: PathBuf::from(format!("<{role} image>")),
            reason: "image has no pixels".into(),
        });
    }
    Ok(())
}

fn model_unavailable(path: &Path, err: anyhow::Error) -> SwapError {
    SwapError::ModelUnavailable {
        path: path.to_path_buf(),
        reason: format!("{err:#}"),
    }
}
