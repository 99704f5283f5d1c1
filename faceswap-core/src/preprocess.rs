//! Preprocessing for YuNet inference.
//!
//! Images are resized to the detector input, converted into the BGR CHW layout OpenCV's
//! `blobFromImage` produces, and the scale factors needed to map detections back onto the source
//! image are returned alongside the tensor.

use std::borrow::Cow;

use anyhow::Result;
use faceswap_utils::config::InputDimensions;
use faceswap_utils::telemetry::timing_guard;
use faceswap_utils::{compute_resize_scales, resize_image, rgb_to_bgr_chw};
use image::{RgbImage, imageops::FilterType};
use tract_onnx::prelude::Tensor;

use crate::model::tensor_from_array;

/// Desired input resolution for YuNet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSize {
    pub width: u32,
    pub height: u32,
}

impl InputSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for InputSize {
    fn default() -> Self {
        Self::new(640, 640)
    }
}

impl From<InputDimensions> for InputSize {
    fn from(dimensions: InputDimensions) -> Self {
        InputSize::new(dimensions.width, dimensions.height)
    }
}

impl From<&InputDimensions> for InputSize {
    fn from(dimensions: &InputDimensions) -> Self {
        (*dimensions).into()
    }
}

/// Output of preprocessing: tensor plus metadata for rescaling detections.
#[derive(Debug)]
pub struct PreprocessOutput {
    /// `[1, 3, H, W]` BGR tensor with raw 0-255 values.
    pub tensor: Tensor,
    pub scale_x: f32,
    pub scale_y: f32,
    pub original_size: (u32, u32),
}

/// Abstraction over preprocessing backends.
pub trait Preprocessor: Send + Sync + std::fmt::Debug {
    fn preprocess(&self, image: &RgbImage, input_size: InputSize) -> Result<PreprocessOutput>;
}

/// Default CPU implementation backed by `image` + ndarray utilities.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuPreprocessor;

impl Preprocessor for CpuPreprocessor {
    fn preprocess(&self, image: &RgbImage, input_size: InputSize) -> Result<PreprocessOutput> {
        let _guard = timing_guard("faceswap_core::preprocess", log::Level::Trace);
        let InputSize {
            width: input_w,
            height: input_h,
        } = input_size;
        anyhow::ensure!(
            input_w > 0 && input_h > 0,
            "input dimensions must be greater than zero"
        );

        let (orig_w, orig_h) = image.dimensions();
        anyhow::ensure!(
            orig_w > 0 && orig_h > 0,
            "source image dimensions must be greater than zero"
        );
        let resized: Cow<'_, RgbImage> = if (orig_w, orig_h) == (input_w, input_h) {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(resize_image(image, input_w, input_h, FilterType::Triangle))
        };

        let chw = rgb_to_bgr_chw(&resized).insert_axis(ndarray::Axis(0));
        let tensor = tensor_from_array(chw)?;
        let (scale_x, scale_y) = compute_resize_scales((orig_w, orig_h), (input_w, input_h))?;

        Ok(PreprocessOutput {
            tensor,
            scale_x,
            scale_y,
            original_size: (orig_w, orig_h),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn preprocess_generates_bgr_tensor() {
        let img = RgbImage::from_fn(4, 4, |x, y| {
            let value = ((x + y) * 32) as u8;
            Rgb([value, value / 2, 255])
        });

        let output = CpuPreprocessor
            .preprocess(&img, InputSize::new(2, 2))
            .expect("preprocess should succeed");

        assert_eq!(output.original_size, (4, 4));
        assert_eq!((output.scale_x, output.scale_y), (2.0, 2.0));
        assert_eq!(output.tensor.shape(), &[1, 3, 2, 2]);

        let data = output.tensor.as_slice::<f32>().unwrap();
        // Blue plane first.
        assert!(data[..4].iter().all(|v| *v == 255.0));
        assert!(data.iter().all(|v| *v >= 0.0 && *v <= 255.0));
    }

    #[test]
    fn same_size_input_is_not_resampled() {
        let img = RgbImage::from_fn(3, 2, |x, _| Rgb([x as u8 * 10, 0, 0]));
        let output = CpuPreprocessor.preprocess(&img, InputSize::new(3, 2)).unwrap();
        let data = output.tensor.as_slice::<f32>().unwrap();
        // Red plane is last: values 0, 10, 20 per row.
        assert_eq!(&data[12..15], &[0.0, 10.0, 20.0]);
    }

    #[test]
    fn converts_dimensions_into_size() {
        let size: InputSize = InputDimensions {
            width: 320,
            height: 240,
        }
        .into();
        assert_eq!(size, InputSize::new(320, 240));
    }

    #[test]
    fn rejects_empty_images() {
        assert!(CpuPreprocessor.preprocess(&RgbImage::new(0, 0), InputSize::default()).is_err());
    }
}
