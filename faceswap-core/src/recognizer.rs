//! ArcFace identity embeddings.

use std::path::Path;

use anyhow::{Context, Result};
use faceswap_utils::{rgb_to_normalized_nchw, timing_guard};
use image::RgbImage;

use crate::align::align_face;
use crate::model::{OnnxModel, tensor_from_array};
use crate::postprocess::Face;

/// Side length of the aligned crop ArcFace expects.
pub const RECOGNIZER_INPUT_SIZE: u32 = 112;
/// Length of an identity embedding.
pub const EMBEDDING_DIM: usize = 512;

#[derive(Debug)]
pub struct ArcFaceRecognizer {
    model: OnnxModel,
}

impl ArcFaceRecognizer {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let side = RECOGNIZER_INPUT_SIZE as usize;
        let model = OnnxModel::load(model_path, "ArcFace", &[&[1, 3, side, side]])?;
        Ok(Self { model })
    }

    /// L2-normalised embedding of `face` within `image`.
    pub fn embedding(&self, image: &RgbImage, face: &Face) -> Result<Vec<f32>> {
        let _guard = timing_guard("faceswap_core::embedding", log::Level::Trace);
        let aligned = align_face(image, &face.landmarks, RECOGNIZER_INPUT_SIZE)
            .context("face landmarks are degenerate; cannot align for recognition")?;
        self.embed_aligned(&aligned.crop)
    }

    /// Embedding of an already aligned 112x112 crop.
    pub fn embed_aligned(&self, crop: &RgbImage) -> Result<Vec<f32>> {
        anyhow::ensure!(
            crop.dimensions() == (RECOGNIZER_INPUT_SIZE, RECOGNIZER_INPUT_SIZE),
            "recognizer expects a {0}x{0} crop, got {1}x{2}",
            RECOGNIZER_INPUT_SIZE,
            crop.width(),
            crop.height()
        );
        let input = tensor_from_array(rgb_to_normalized_nchw(crop, 127.5, 127.5))?;
        let output = self.model.run_single(input)?;
        let raw = output
            .as_slice::<f32>()
            .map_err(|e| anyhow::anyhow!("ArcFace output is not f32: {e}"))?;
        anyhow::ensure!(
            raw.len() == EMBEDDING_DIM,
            "ArcFace produced {} values, expected {EMBEDDING_DIM}",
            raw.len()
        );

        let mut embedding = raw.to_vec();
        anyhow::ensure!(
            l2_normalize(&mut embedding),
            "ArcFace produced an all-zero embedding"
        );
        Ok(embedding)
    }
}

/// Scale `values` to unit length in place. Returns `false` for a zero vector.
pub fn l2_normalize(values: &mut [f32]) -> bool {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        return false;
    }
    values.iter_mut().for_each(|v| *v /= norm);
    true
}

/// Cosine similarity of two embeddings of equal length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let nb = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if na <= f32::EPSILON || nb <= f32::EPSILON {
        0.0
    } else {
        dot / (na * nb)
    }
}
