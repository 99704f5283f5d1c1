use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader, RgbImage, imageops::FilterType};
use ndarray::{Array3, Array4};

/// Decode an image from disk, sniffing the format from its content.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path_ref = path.as_ref();
    ImageReader::open(path_ref)
        .with_context(|| format!("failed to open image {}", path_ref.display()))?
        .with_guessed_format()
        .with_context(|| format!("failed to read image header {}", path_ref.display()))?
        .decode()
        .with_context(|| format!("failed to decode image {}", path_ref.display()))
}

/// Decode an image and flatten it to 8-bit RGB. Alpha is discarded.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path_ref = path.as_ref();
    let image = load_image(path_ref)?;
    anyhow::ensure!(
        image.width() > 0 && image.height() > 0,
        "image {} has no pixels",
        path_ref.display()
    );
    Ok(image.to_rgb8())
}

/// Resize an image to the requested resolution using the provided filter.
pub fn resize_image(image: &RgbImage, width: u32, height: u32, filter: FilterType) -> RgbImage {
    image::imageops::resize(image, width, height, filter)
}

/// Convert an RGB image into a BGR CHW array with raw 0-255 values.
///
/// This is the layout OpenCV's `blobFromImage` produces without scaling, which the YuNet
/// detector expects.
pub fn rgb_to_bgr_chw(image: &RgbImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    let mut array = Array3::<f32>::zeros((3, height as usize, width as usize));
    for (x, y, pixel) in image.enumerate_pixels() {
        let (xi, yi) = (x as usize, y as usize);
        array[(0, yi, xi)] = pixel[2] as f32;
        array[(1, yi, xi)] = pixel[1] as f32;
        array[(2, yi, xi)] = pixel[0] as f32;
    }
    array
}

/// Convert an RGB image into a `[1, 3, H, W]` tensor of `(value - mean) / std`.
pub fn rgb_to_normalized_nchw(image: &RgbImage, mean: f32, std: f32) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let mut array = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in image.enumerate_pixels() {
        let (xi, yi) = (x as usize, y as usize);
        for c in 0..3 {
            array[(0, c, yi, xi)] = (pixel[c] as f32 - mean) / std;
        }
    }
    array
}

/// Per-channel RGB mean. Zero for an empty image.
pub fn channel_means(image: &RgbImage) -> [f32; 3] {
    let count = image.width() as f64 * image.height() as f64;
    if count == 0.0 {
        return [0.0; 3];
    }
    let mut sums = [0.0f64; 3];
    for px in image.pixels() {
        for c in 0..3 {
            sums[c] += px[c] as f64;
        }
    }
    sums.map(|s| (s / count) as f32)
}

/// Compute scale factors used to reproject detections from model space to original space.
pub fn compute_resize_scales(original: (u32, u32), target: (u32, u32)) -> Result<(f32, f32)> {
    let (orig_w, orig_h) = original;
    let (target_w, target_h) = target;
    anyhow::ensure!(
        target_w > 0 && target_h > 0,
        "target dimensions must be non-zero"
    );
    anyhow::ensure!(
        orig_w > 0 && orig_h > 0,
        "original dimensions must be non-zero"
    );
    Ok((
        orig_w as f32 / target_w as f32,
        orig_h as f32 / target_h as f32,
    ))
}
