//! Debug overlays: detected boxes and landmarks drawn onto copies of the inputs.

use std::path::{Path, PathBuf};

use anyhow::Result;
use faceswap_core::{BoundingBox, Face};
use faceswap_utils::{OutputOptions, save_rgb_image};
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_hollow_rect_mut},
    rect::Rect,
};

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// One colour per landmark: right eye, left eye, nose, right mouth corner, left mouth corner.
const LANDMARK_COLORS: [Rgb<u8>; 5] = [
    Rgb([0, 0, 255]),
    Rgb([0, 255, 255]),
    Rgb([255, 0, 255]),
    Rgb([0, 255, 0]),
    Rgb([255, 255, 0]),
];

/// Draw `faces` on a copy of `image`.
pub fn draw_faces(image: &RgbImage, faces: &[Face]) -> RgbImage {
    let mut canvas = image.clone();
    let (img_w, img_h) = canvas.dimensions();
    if img_w == 0 || img_h == 0 {
        return canvas;
    }

    let radius = ((img_w.min(img_h) as f32) / 200.0).round().max(2.0) as i32;
    for face in faces {
        draw_hollow_rect_mut(&mut canvas, rect_from_bbox(&face.bbox, img_w, img_h), BOX_COLOR);
        for (lm, color) in face.landmarks.iter().zip(LANDMARK_COLORS) {
            let center = (clamp_to_i32(lm.x, img_w), clamp_to_i32(lm.y, img_h));
            draw_filled_circle_mut(&mut canvas, center, radius, color);
        }
    }
    canvas
}

/// Draw `faces` on `image` and save it as `{role}_{stem}.png` inside `output_dir`.
pub fn annotate_image(
    image: &RgbImage,
    faces: &[Face],
    original_path: &Path,
    role: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let stem = original_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let output_path = output_dir.join(format!("{role}_{stem}.png"));
    save_rgb_image(&draw_faces(image, faces), &output_path, &OutputOptions::default())?;
    Ok(output_path)
}

fn rect_from_bbox(bbox: &BoundingBox, img_w: u32, img_h: u32) -> Rect {
    let max_x = (img_w - 1) as f32;
    let max_y = (img_h - 1) as f32;

    let x1 = bbox.x.clamp(0.0, max_x);
    let y1 = bbox.y.clamp(0.0, max_y);
    let x2 = (bbox.x + bbox.width).clamp(0.0, max_x);
    let y2 = (bbox.y + bbox.height).clamp(0.0, max_y);

    let width = (x2 - x1).max(1.0).round() as u32;
    let height = (y2 - y1).max(1.0).round() as u32;

    Rect::at(x1.round() as i32, y1.round() as i32).of_size(width, height)
}

#[inline]
fn clamp_to_i32(value: f32, max_extent: u32) -> i32 {
    value.clamp(0.0, (max_extent - 1) as f32).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use faceswap_core::Landmark;
    use tempfile::tempdir;

    fn face() -> Face {
        Face {
            bbox: BoundingBox {
                x: 10.0,
                y: 10.0,
                width: 40.0,
                height: 40.0,
            },
            landmarks: [
                Landmark::new(20.0, 22.0),
                Landmark::new(40.0, 22.0),
                Landmark::new(30.0, 30.0),
                Landmark::new(22.0, 40.0),
                Landmark::new(38.0, 40.0),
            ],
            score: 0.9,
        }
    }

    #[test]
    fn draws_box_and_landmarks() {
        let image = RgbImage::new(64, 64);
        let drawn = draw_faces(&image, &[face()]);
        assert_eq!(drawn.get_pixel(10, 30), &BOX_COLOR);
        assert_eq!(drawn.get_pixel(30, 30), &LANDMARK_COLORS[2]);
        assert_eq!(drawn.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn boxes_outside_the_image_are_clamped() {
        let rect = rect_from_bbox(
            &BoundingBox {
                x: -20.0,
                y: 50.0,
                width: 200.0,
                height: 5.0,
            },
            100,
            60,
        );
        assert_eq!((rect.left(), rect.top()), (0, 50));
        assert_eq!(rect.width(), 99);
    }

    #[test]
    fn annotated_copy_is_written_with_role_prefix() {
        let dir = tempdir().unwrap();
        let image = RgbImage::new(32, 32);
        let path = annotate_image(
            &image,
            &[],
            Path::new("photos/portrait.jpg"),
            "source",
            &dir.path().join("debug"),
        )
        .unwrap();
        assert!(path.ends_with("source_portrait.png"));
        assert!(path.exists());
    }
}
