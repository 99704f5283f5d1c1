//! Landmark alignment via a 4-DOF similarity transform.
//!
//! Faces are mapped onto the five-point ArcFace template so the recognizer and the swap
//! generator always see eyes, nose and mouth at fixed positions.

use image::{Rgb, RgbImage};

use crate::postprocess::Landmark;

/// ArcFace reference landmarks for a 112x112 crop, in the detector's landmark order.
pub const ARCFACE_TEMPLATE_112: [(f32, f32); 5] = [
    (38.2946, 51.6963),
    (73.5318, 51.5014),
    (56.0252, 71.7366),
    (41.5493, 92.3655),
    (70.7299, 92.2041),
];

/// Template for a square crop of `size` pixels.
///
/// Multiples of 112 scale the template directly. Other sizes (such as the 128 px swap crop)
/// scale by `size / 128` and shift right by `8 * ratio`, which is the layout the swap models
/// were trained on.
pub fn template_for(size: u32) -> [(f32, f32); 5] {
    let (ratio, shift_x) = if size % 112 == 0 {
        (size as f32 / 112.0, 0.0)
    } else {
        let ratio = size as f32 / 128.0;
        (ratio, 8.0 * ratio)
    };
    ARCFACE_TEMPLATE_112.map(|(x, y)| (x * ratio + shift_x, y * ratio))
}

/// Similarity transform `[a -b tx; b a ty]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityTransform {
    pub a: f32,
    pub b: f32,
    pub tx: f32,
    pub ty: f32,
}

impl SimilarityTransform {
    pub const IDENTITY: SimilarityTransform = SimilarityTransform {
        a: 1.0,
        b: 0.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Least-squares fit mapping `src` points onto `dst` points. `None` when the source points
    /// are degenerate (all coincident).
    pub fn estimate(src: &[(f32, f32)], dst: &[(f32, f32)]) -> Option<Self> {
        if src.len() != dst.len() || src.is_empty() {
            return None;
        }
        let n = src.len() as f64;
        let mean = |pts: &[(f32, f32)]| {
            let (sx, sy) = pts
                .iter()
                .fold((0.0f64, 0.0f64), |(ax, ay), &(x, y)| (ax + x as f64, ay + y as f64));
            (sx / n, sy / n)
        };
        let (msx, msy) = mean(src);
        let (mdx, mdy) = mean(dst);

        let (mut dot, mut cross, mut norm) = (0.0f64, 0.0f64, 0.0f64);
        for (&(sx, sy), &(dx, dy)) in src.iter().zip(dst) {
            let (xs, ys) = (sx as f64 - msx, sy as f64 - msy);
            let (xd, yd) = (dx as f64 - mdx, dy as f64 - mdy);
            dot += xs * xd + ys * yd;
            cross += xs * yd - ys * xd;
            norm += xs * xs + ys * ys;
        }
        if norm < 1e-9 {
            return None;
        }

        let a = dot / norm;
        let b = cross / norm;
        Some(Self {
            a: a as f32,
            b: b as f32,
            tx: (mdx - (a * msx - b * msy)) as f32,
            ty: (mdy - (b * msx + a * msy)) as f32,
        })
    }

    /// Transform mapping the detected `landmarks` onto the template for a `size` px crop.
    pub fn to_template(landmarks: &[Landmark; 5], size: u32) -> Option<Self> {
        let src = landmarks.map(|lm| (lm.x, lm.y));
        Self::estimate(&src, &template_for(size))
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x - self.b * y + self.tx,
            self.b * x + self.a * y + self.ty,
        )
    }

    /// Uniform scale factor of the transform.
    pub fn scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    pub fn inverse(&self) -> Option<Self> {
        let det = self.a * self.a + self.b * self.b;
        if det.abs() < 1e-12 {
            return None;
        }
        let (ia, ib) = (self.a / det, -self.b / det);
        Some(Self {
            a: ia,
            b: ib,
            tx: -(ia * self.tx - ib * self.ty),
            ty: -(ib * self.tx + ia * self.ty),
        })
    }
}

/// Bilinear sample at a fractional position. Pixels outside the image read as black.
pub(crate) fn sample_bilinear(image: &RgbImage, x: f32, y: f32) -> [f32; 3] {
    let (w, h) = (image.width() as i64, image.height() as i64);
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let texel = |px: i64, py: i64| -> [f32; 3] {
        if px >= 0 && px < w && py >= 0 && py < h {
            image.get_pixel(px as u32, py as u32).0.map(f32::from)
        } else {
            [0.0; 3]
        }
    };

    let (p00, p10, p01, p11) = (
        texel(x0, y0),
        texel(x0 + 1, y0),
        texel(x0, y0 + 1),
        texel(x0 + 1, y0 + 1),
    );
    std::array::from_fn(|c| {
        p00[c] * (1.0 - fx) * (1.0 - fy)
            + p10[c] * fx * (1.0 - fy)
            + p01[c] * (1.0 - fx) * fy
            + p11[c] * fx * fy
    })
}

/// Warp `image` into a `size` x `size` crop where `transform` maps source to crop coordinates.
pub fn warp_to_crop(image: &RgbImage, transform: &SimilarityTransform, size: u32) -> RgbImage {
    let Some(inverse) = transform.inverse() else {
        return RgbImage::new(size, size);
    };
    RgbImage::from_fn(size, size, |u, v| {
        let (sx, sy) = inverse.apply(u as f32, v as f32);
        Rgb(sample_bilinear(image, sx, sy).map(|c| c.round().clamp(0.0, 255.0) as u8))
    })
}

/// Aligned crop of a face plus the transform that produced it.
#[derive(Debug, Clone)]
pub struct AlignedFace {
    pub crop: RgbImage,
    pub transform: SimilarityTransform,
}

/// Align a face onto the ArcFace template at `size` px. `None` for degenerate landmarks.
pub fn align_face(image: &RgbImage, landmarks: &[Landmark; 5], size: u32) -> Option<AlignedFace> {
    let transform = SimilarityTransform::to_template(landmarks, size)?;
    Some(AlignedFace {
        crop: warp_to_crop(image, &transform, size),
        transform,
    })
}
