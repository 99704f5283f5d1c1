use std::path::Path;

use anyhow::Result;
use image::RgbImage;

use crate::model::OnnxModel;
use crate::postprocess::{
    Face, HEAD_OUTPUTS, PostprocessConfig, apply_postprocess, decode_yunet_heads,
};
use crate::preprocess::{CpuPreprocessor, InputSize, Preprocessor};
use faceswap_utils::timing_guard;

/// Anything that can find faces in an RGB image.
///
/// Implementations return every face they find, ordered left to right. An empty list is a valid
/// answer; deciding whether that is an error is up to the caller.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Face>>;
}

/// YuNet face detector running through `tract-onnx`.
#[derive(Debug)]
pub struct YuNetDetector {
    model: OnnxModel,
    input_size: InputSize,
    postprocess: PostprocessConfig,
    preprocessor: CpuPreprocessor,
}

impl YuNetDetector {
    /// Load the detector graph with its input pinned to `input_size`.
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        input_size: InputSize,
        postprocess: PostprocessConfig,
    ) -> Result<Self> {
        let shape = [1, 3, input_size.height as usize, input_size.width as usize];
        let model = OnnxModel::load(model_path, "YuNet", &[&shape])?;
        Ok(Self {
            model,
            input_size,
            postprocess,
            preprocessor: CpuPreprocessor,
        })
    }

    pub fn input_size(&self) -> InputSize {
        self.input_size
    }

    pub fn postprocess_config(&self) -> &PostprocessConfig {
        &self.postprocess
    }
}

impl FaceDetector for YuNetDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Face>> {
        let _guard = timing_guard("faceswap_core::detect", log::Level::Debug);
        let prep = self.preprocessor.preprocess(image, self.input_size)?;

        let mut outputs = {
            let _guard = timing_guard("faceswap_core::yunet_inference", log::Level::Trace);
            self.model.run(vec![prep.tensor])?
        };

        let raw = match outputs.len() {
            1 => outputs.swap_remove(0),
            HEAD_OUTPUTS => decode_yunet_heads(&outputs, self.input_size)?,
            other => anyhow::bail!(
                "unexpected number of YuNet outputs: expected 1 or {HEAD_OUTPUTS}, got {other}"
            ),
        };

        let faces = apply_postprocess(&raw, prep.scale_x, prep.scale_y, &self.postprocess)?;
        log::debug!(
            "YuNet found {} face(s) in {}x{} image",
            faces.len(),
            prep.original_size.0,
            prep.original_size.1
        );
        Ok(faces)
    }
}
