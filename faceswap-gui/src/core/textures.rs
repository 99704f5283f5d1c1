//! Uploading RGB buffers as egui textures.

use egui::{ColorImage, Context as EguiContext, TextureHandle, TextureOptions};
use image::RgbImage;

/// Convert an RGB buffer into an egui image.
pub fn color_image_from_rgb(image: &RgbImage) -> ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    ColorImage::from_rgb(size, image.as_raw())
}

/// Upload `image` as a new texture named `{prefix}-{seq}` and advance the sequence.
pub fn load_texture_from_rgb(
    ctx: &EguiContext,
    prefix: &str,
    image: &RgbImage,
    texture_seq: &mut u64,
) -> TextureHandle {
    let texture_name = format!("{prefix}-{texture_seq}");
    *texture_seq = texture_seq.wrapping_add(1);
    ctx.load_texture(texture_name, color_image_from_rgb(image), TextureOptions::LINEAR)
}
