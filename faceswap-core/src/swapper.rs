//! Identity transfer: the `FaceSwapper` seam and its inswapper implementation.
//!
//! A swap happens in two steps. The source face is turned into an [`Identity`] once, then that
//! identity is rendered onto one or more target faces. `InSwapper` aligns each target face to a
//! 128 px crop, runs the generator, and blends the generated crop back through the inverse
//! alignment with a feathered mask so pixels outside the face stay untouched.

use std::path::Path;

use anyhow::{Context, Result};
use faceswap_utils::{rgb_to_normalized_nchw, timing_guard};
use image::{Rgb, RgbImage};
use log::debug;
use ndarray::{Array2, ArrayView1};
use tract_onnx::prelude::{Framework, Tensor};

use crate::align::{SimilarityTransform, align_face, sample_bilinear};
use crate::model::{OnnxModel, tensor_from_array};
use crate::postprocess::Face;
use crate::recognizer::{ArcFaceRecognizer, EMBEDDING_DIM, l2_normalize};

/// Side length of the generator's aligned crop.
pub const SWAP_CROP_SIZE: u32 = 128;

/// Unit-length identity vector handed from [`FaceSwapper::identity`] to [`FaceSwapper::swap`].
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    values: Vec<f32>,
}

impl Identity {
    /// Normalise `values` into an identity. Fails on empty or all-zero input.
    pub fn from_vector(mut values: Vec<f32>) -> Result<Self> {
        anyhow::ensure!(!values.is_empty(), "identity vector is empty");
        anyhow::ensure!(
            values.iter().all(|v| v.is_finite()),
            "identity vector contains non-finite values"
        );
        anyhow::ensure!(l2_normalize(&mut values), "identity vector has zero length");
        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Anything that can transplant a source identity onto a target face.
pub trait FaceSwapper: Send + Sync {
    /// Extract the identity of `face` in `source`.
    fn identity(&self, source: &RgbImage, face: &Face) -> Result<Identity>;

    /// Render `identity` onto `face` in `target`. The result has the target's dimensions.
    fn swap(&self, target: &RgbImage, face: &Face, identity: &Identity) -> Result<RgbImage>;
}

/// inswapper_128 generator paired with an ArcFace recognizer.
#[derive(Debug)]
pub struct InSwapper {
    model: OnnxModel,
    recognizer: ArcFaceRecognizer,
    emap: Array2<f32>,
    target_first: bool,
}

impl InSwapper {
    pub fn new<P: AsRef<Path>>(swapper_path: P, recognizer: ArcFaceRecognizer) -> Result<Self> {
        let swapper_path = swapper_path.as_ref();
        let model = OnnxModel::load(swapper_path, "inswapper", &[])?;
        let emap = load_emap(swapper_path)?;

        let names = model.input_names();
        anyhow::ensure!(
            names.len() == 2,
            "inswapper graph should have 2 inputs, found {}: {names:?}",
            names.len()
        );
        let target_first = names[0] != "source";
        debug!("inswapper inputs {names:?}, emap {:?}", emap.dim());

        Ok(Self {
            model,
            recognizer,
            emap,
            target_first,
        })
    }

    pub fn recognizer(&self) -> &ArcFaceRecognizer {
        &self.recognizer
    }

    fn generate(&self, crop: &RgbImage, identity: &Identity) -> Result<RgbImage> {
        let target = tensor_from_array(rgb_to_normalized_nchw(crop, 0.0, 255.0))?;
        let source = Tensor::from_shape(&[1, identity.len()], identity.as_slice())
            .map_err(|e| anyhow::anyhow!("failed to build identity tensor: {e}"))?;
        let inputs = if self.target_first {
            vec![target, source]
        } else {
            vec![source, target]
        };

        let outputs = self.model.run(inputs)?;
        let data = outputs[0]
            .as_slice::<f32>()
            .map_err(|e| anyhow::anyhow!("inswapper output is not f32: {e}"))?;
        chw_unit_to_rgb(data, SWAP_CROP_SIZE)
    }
}

impl FaceSwapper for InSwapper {
    fn identity(&self, source: &RgbImage, face: &Face) -> Result<Identity> {
        let embedding = self.recognizer.embedding(source, face)?;
        project_identity(&embedding, &self.emap)
    }

    fn swap(&self, target: &RgbImage, face: &Face, identity: &Identity) -> Result<RgbImage> {
        let _guard = timing_guard("faceswap_core::inswapper", log::Level::Debug);
        anyhow::ensure!(
            identity.len() == self.emap.ncols(),
            "identity has {} values, generator expects {}",
            identity.len(),
            self.emap.ncols()
        );
        let aligned = align_face(target, &face.landmarks, SWAP_CROP_SIZE)
            .context("target face landmarks are degenerate")?;
        let generated = self.generate(&aligned.crop, identity)?;
        paste_back(target, &generated, &aligned.transform)
    }
}

/// Read the identity projection matrix stored as the swap graph's last initializer.
pub fn load_emap<P: AsRef<Path>>(path: P) -> Result<Array2<f32>> {
    let path = path.as_ref();
    let proto = tract_onnx::onnx()
        .proto_model_for_path(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let graph = proto
        .graph
        .as_ref()
        .with_context(|| format!("{} has no graph", path.display()))?;
    let initializer = graph
        .initializer
        .last()
        .with_context(|| format!("{} has no initializers", path.display()))?;

    let dims: Vec<usize> = initializer.dims.iter().map(|&d| d.max(0) as usize).collect();
    anyhow::ensure!(
        dims == [EMBEDDING_DIM, EMBEDDING_DIM],
        "expected a {EMBEDDING_DIM}x{EMBEDDING_DIM} emap initializer, found {dims:?} ('{}')",
        initializer.name
    );

    let values: Vec<f32> = if !initializer.float_data.is_empty() {
        initializer.float_data.clone()
    } else {
        initializer
            .raw_data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    };
    Array2::from_shape_vec((dims[0], dims[1]), values)
        .context("emap initializer has the wrong number of values")
}

/// Project a recognizer embedding through `emap` into the generator's latent space.
pub fn project_identity(embedding: &[f32], emap: &Array2<f32>) -> Result<Identity> {
    anyhow::ensure!(
        embedding.len() == emap.nrows(),
        "embedding has {} values, emap expects {}",
        embedding.len(),
        emap.nrows()
    );
    let mut normalized = embedding.to_vec();
    anyhow::ensure!(l2_normalize(&mut normalized), "embedding has zero length");
    let latent = ArrayView1::from(&normalized).dot(emap);
    Identity::from_vector(latent.to_vec())
}

/// Convert a `[1, 3, S, S]` RGB tensor in `[0, 1]` into an image.
fn chw_unit_to_rgb(data: &[f32], size: u32) -> Result<RgbImage> {
    let plane = (size * size) as usize;
    anyhow::ensure!(
        data.len() == plane * 3,
        "generator produced {} values, expected {}",
        data.len(),
        plane * 3
    );
    Ok(RgbImage::from_fn(size, size, |x, y| {
        let idx = (y * size + x) as usize;
        Rgb(std::array::from_fn(|c| {
            (data[c * plane + idx] * 255.0).round().clamp(0.0, 255.0) as u8
        }))
    }))
}

/// Blend weight at crop position `(u, v)`: zero within `size / 10` of the crop border, rising
/// linearly to one over the next `size / 20` pixels.
pub fn feather_weight(u: f32, v: f32, size: u32) -> f32 {
    let last = size.saturating_sub(1) as f32;
    let edge = u.min(v).min(last - u).min(last - v);
    let erode = size as f32 / 10.0;
    let feather = (size as f32 / 20.0).max(1.0);
    ((edge - erode) / feather).clamp(0.0, 1.0)
}

/// Blend `crop` back into `target` through the inverse of `transform` (target to crop).
pub fn paste_back(
    target: &RgbImage,
    crop: &RgbImage,
    transform: &SimilarityTransform,
) -> Result<RgbImage> {
    let size = crop.width();
    anyhow::ensure!(
        size > 0 && crop.height() == size,
        "paste-back expects a square crop, got {}x{}",
        crop.width(),
        crop.height()
    );
    let inverse = transform
        .inverse()
        .context("alignment transform is not invertible")?;

    let (tw, th) = target.dimensions();
    let corners = [(0.0, 0.0), (size as f32, 0.0), (0.0, size as f32), (size as f32, size as f32)]
        .map(|(u, v)| inverse.apply(u, v));
    let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max).ceil();
    let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max).ceil();
    let max_x = (max_x.max(0.0) as u32).min(tw);
    let max_y = (max_y.max(0.0) as u32).min(th);

    let mut output = target.clone();
    let last = (size - 1) as f32;
    for y in min_y..max_y {
        for x in min_x..max_x {
            let (u, v) = transform.apply(x as f32, y as f32);
            if !(0.0..=last).contains(&u) || !(0.0..=last).contains(&v) {
                continue;
            }
            let weight = feather_weight(u, v, size);
            if weight <= 0.0 {
                continue;
            }
            let generated = sample_bilinear(crop, u, v);
            let pixel = output.get_pixel_mut(x, y);
            for c in 0..3 {
                let blended = pixel[c] as f32 * (1.0 - weight) + generated[c] * weight;
                pixel[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_normalized() {
        let identity = Identity::from_vector(vec![0.0, 3.0, 4.0]).unwrap();
        assert_eq!(identity.len(), 3);
        assert!((identity.as_slice()[1] - 0.6).abs() < 1e-6);
        assert!(Identity::from_vector(vec![0.0; 3]).is_err());
        assert!(Identity::from_vector(Vec::new()).is_err());
        assert!(Identity::from_vector(vec![f32::NAN, 1.0]).is_err());
    }

    #[test]
    fn projection_through_identity_matrix_keeps_direction() {
        let emap = Array2::<f32>::eye(4);
        let identity = project_identity(&[2.0, 0.0, 0.0, 0.0], &emap).unwrap();
        assert_eq!(identity.as_slice(), &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn projection_applies_row_vector_product() {
        // Row vector times matrix: [1, 0] * [[0, 1], [1, 0]] = [0, 1].
        let emap = Array2::from_shape_vec((2, 2), vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        let identity = project_identity(&[1.0, 0.0], &emap).unwrap();
        assert_eq!(identity.as_slice(), &[0.0, 1.0]);
        assert!(project_identity(&[1.0, 0.0, 0.0], &emap).is_err());
    }

    #[test]
    fn feather_weight_is_zero_at_border_and_one_in_center() {
        assert_eq!(feather_weight(0.0, 64.0, 128), 0.0);
        assert_eq!(feather_weight(12.0, 64.0, 128), 0.0);
        assert_eq!(feather_weight(64.0, 64.0, 128), 1.0);
        let mid = feather_weight(15.9, 64.0, 128);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn generator_output_is_scaled_to_bytes() {
        let mut data = vec![0.0f32; 3 * 4];
        data[0] = 1.0; // red of pixel (0, 0)
        data[4 + 1] = 0.5; // green of pixel (1, 0)
        data[8 + 3] = 2.0; // blue of pixel (1, 1), clamped
        let image = chw_unit_to_rgb(&data, 2).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 128, 0]);
        assert_eq!(image.get_pixel(1, 1).0, [0, 0, 255]);
        assert!(chw_unit_to_rgb(&data[..5], 2).is_err());
    }

    #[test]
    fn paste_back_only_touches_the_face_region() {
        let target = RgbImage::from_pixel(300, 300, Rgb([10, 20, 30]));
        let crop = RgbImage::from_pixel(128, 128, Rgb([250, 250, 250]));
        // Crop covers target pixels 100..164 in both axes at half scale.
        let transform = SimilarityTransform {
            a: 2.0,
            b: 0.0,
            tx: -200.0,
            ty: -200.0,
        };

        let result = paste_back(&target, &crop, &transform).unwrap();
        assert_eq!(result.dimensions(), target.dimensions());
        assert_eq!(result.get_pixel(132, 132).0, [250, 250, 250]);
        assert_eq!(result.get_pixel(101, 132).0, [10, 20, 30]);
        assert_eq!(result.get_pixel(20, 20).0, [10, 20, 30]);
        assert_eq!(result.get_pixel(250, 250).0, [10, 20, 30]);
    }

    #[test]
    fn paste_back_clips_faces_at_the_image_edge() {
        let target = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        let crop = RgbImage::from_pixel(128, 128, Rgb([200, 100, 50]));
        let transform = SimilarityTransform {
            a: 2.0,
            b: 0.0,
            tx: 40.0,
            ty: 40.0,
        };
        let result = paste_back(&target, &crop, &transform).unwrap();
        assert_eq!(result.get_pixel(12, 12).0, [200, 100, 50]);
        assert_eq!(result.get_pixel(63, 63).0, [0, 0, 0]);
    }

    #[test]
    fn non_square_crops_are_rejected() {
        let target = RgbImage::new(10, 10);
        let crop = RgbImage::new(8, 4);
        assert!(paste_back(&target, &crop, &SimilarityTransform::IDENTITY).is_err());
    }
}
