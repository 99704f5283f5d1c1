//! Post-swap enhancement filters.
//!
//! The chain runs in a fixed order: detail finish, skin smoothing, facial feature boost, color
//! correction, then HDR tone mapping. Which steps run (and how strongly) is chosen by
//! [`EnhancementSettings::for_quality`]. Every filter is a pure function of its inputs and keeps
//! the image dimensions.

use image::RgbImage;
use log::debug;

use crate::color::{boost_saturation, lab_to_rgb, rgb_to_lab};
use crate::image_utils::channel_means;
use crate::quality::QualityLevel;

const EPSILON: f32 = 1e-6;

/// Axis-aligned face rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a region from floating point box coordinates, dropping anything left of or above
    /// the origin.
    pub fn from_box(x: f32, y: f32, width: f32, height: f32) -> Option<Self> {
        let x1 = (x + width).max(0.0);
        let y1 = (y + height).max(0.0);
        let x0 = x.max(0.0);
        let y0 = y.max(0.0);
        if !(x1 > x0 && y1 > y0) {
            return None;
        }
        Some(Self::new(
            x0.floor() as u32,
            y0.floor() as u32,
            (x1 - x0).ceil() as u32,
            (y1 - y0).ceil() as u32,
        ))
    }

    /// Intersect with a `width` x `height` image. `None` when nothing overlaps.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// Global contrast/saturation lift followed by an unsharp mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailFinish {
    pub contrast: f32,
    pub saturation: f32,
    pub unsharp_amount: f32,
    pub unsharp_radius: f32,
}

impl Default for DetailFinish {
    fn default() -> Self {
        Self {
            contrast: 1.1,
            saturation: 1.1,
            unsharp_amount: 0.5,
            unsharp_radius: 1.0,
        }
    }
}

/// Bilateral smoothing parameters. `amount` is the blend weight of the filtered image inside
/// fully covered face pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinSmoothing {
    pub radius: u32,
    pub sigma_space: f32,
    pub sigma_color: f32,
    pub amount: f32,
}

impl SkinSmoothing {
    pub const LIGHT: SkinSmoothing = SkinSmoothing {
        radius: 3,
        sigma_space: 3.0,
        sigma_color: 20.0,
        amount: 0.45,
    };

    pub const STRONG: SkinSmoothing = SkinSmoothing {
        radius: 5,
        sigma_space: 5.0,
        sigma_color: 35.0,
        amount: 0.8,
    };
}

/// CLAHE on lightness followed by a saturation lift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneMapping {
    pub clip_limit: f32,
    pub tiles: u32,
    /// Saturation increase on the 0-255 scale.
    pub saturation_boost: f32,
}

impl Default for ToneMapping {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tiles: 8,
            saturation_boost: 10.0,
        }
    }
}

/// Which enhancement steps run and with what strength.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnhancementSettings {
    pub detail: Option<DetailFinish>,
    pub skin_smoothing: Option<SkinSmoothing>,
    /// Saturation lift on the eye and lip bands of each face.
    pub feature_boost: bool,
    pub color_correction: bool,
    pub tone_mapping: Option<ToneMapping>,
}

impl EnhancementSettings {
    /// Preset matching a quality level. `Basic` disables every step.
    pub fn for_quality(quality: QualityLevel) -> Self {
        match quality {
            QualityLevel::Basic => Self::default(),
            QualityLevel::Hd => Self {
                detail: Some(DetailFinish::default()),
                skin_smoothing: Some(SkinSmoothing::LIGHT),
                feature_boost: true,
                color_correction: true,
                tone_mapping: None,
            },
            QualityLevel::UltraHd => Self {
                detail: Some(DetailFinish::default()),
                skin_smoothing: Some(SkinSmoothing::STRONG),
                feature_boost: true,
                color_correction: true,
                tone_mapping: Some(ToneMapping::default()),
            },
        }
    }

    pub fn is_noop(&self) -> bool {
        self.detail.is_none()
            && self.skin_smoothing.is_none()
            && !self.feature_boost
            && !self.color_correction
            && self.tone_mapping.is_none()
    }
}

/// Information about the swap that produced the image being enhanced.
#[derive(Debug, Clone, Default)]
pub struct EnhanceContext {
    /// Per-channel RGB mean of the source (identity) image.
    pub source_mean: Option<[f32; 3]>,
    /// Per-channel RGB mean of the original target image.
    pub target_mean: Option<[f32; 3]>,
    /// Face rectangles in the swapped image.
    pub face_regions: Vec<FaceRegion>,
}

impl EnhanceContext {
    pub fn from_images(source: &RgbImage, target: &RgbImage, face_regions: Vec<FaceRegion>) -> Self {
        Self {
            source_mean: Some(channel_means(source)),
            target_mean: Some(channel_means(target)),
            face_regions,
        }
    }
}

/// Run the enhancement chain configured by `settings`.
pub fn enhance(image: &RgbImage, settings: &EnhancementSettings, ctx: &EnhanceContext) -> RgbImage {
    if settings.is_noop() {
        return image.clone();
    }

    let mut out = image.clone();

    if let Some(detail) = settings.detail {
        out = apply_contrast(&out, detail.contrast);
        out = apply_saturation(&out, detail.saturation);
        out = apply_unsharp_mask(&out, detail.unsharp_amount, detail.unsharp_radius);
    }

    if let Some(smoothing) = settings.skin_smoothing {
        debug!(
            "smoothing skin (radius {}, {} face regions)",
            smoothing.radius,
            ctx.face_regions.len()
        );
        out = smooth_skin(&out, &smoothing, &ctx.face_regions);
    }

    if settings.feature_boost {
        out = boost_facial_features(&out, &ctx.face_regions);
    }

    if settings.color_correction {
        match (ctx.source_mean, ctx.target_mean) {
            (Some(source), Some(target)) => out = correct_color(&out, source, target),
            _ => debug!("skipping color correction without source/target statistics"),
        }
    }

    if let Some(tone) = settings.tone_mapping {
        out = tone_map(&out, &tone);
    }

    out
}

/// Shorthand for [`enhance`] with the preset for `quality`.
pub fn enhance_for_quality(
    image: &RgbImage,
    quality: QualityLevel,
    ctx: &EnhanceContext,
) -> RgbImage {
    enhance(image, &EnhancementSettings::for_quality(quality), ctx)
}

pub fn apply_contrast(image: &RgbImage, multiplier: f32) -> RgbImage {
    if (multiplier - 1.0).abs() < EPSILON {
        return image.clone();
    }
    let multiplier = multiplier.clamp(0.5, 2.0);
    let mut out = image.clone();
    for px in out.pixels_mut() {
        for channel in px.0.iter_mut() {
            let normalized = *channel as f32 / 255.0;
            *channel = (((normalized - 0.5) * multiplier + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
    out
}

/// Mix each pixel with its Rec. 601 luma: `gray * (1 - s) + orig * s`.
pub fn apply_saturation(image: &RgbImage, saturation: f32) -> RgbImage {
    if (saturation - 1.0).abs() < EPSILON {
        return image.clone();
    }
    let multiplier = saturation.clamp(0.0, 2.5);
    let mut out = image.clone();
    for px in out.pixels_mut() {
        let [r, g, b] = px.0.map(|c| c as f32);
        let gray = 0.299 * r + 0.587 * g + 0.114 * b;
        px.0 = [r, g, b].map(|c| (gray * (1.0 - multiplier) + c * multiplier).round().clamp(0.0, 255.0) as u8);
    }
    out
}

pub fn apply_unsharp_mask(image: &RgbImage, amount: f32, radius: f32) -> RgbImage {
    if amount <= 0.0 || radius <= 0.0 {
        return image.clone();
    }
    let amount = amount.clamp(0.0, 2.0);
    let blurred = image::imageops::blur(image, radius);
    let mut out = image.clone();
    for (px, blur) in out.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let s = px[c] as f32;
            px[c] = (s + amount * (s - blur[c] as f32)).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Per-pixel weight in `[0, 1]` that is 1 deep inside any face region and falls off linearly
/// toward the region edges. Covers the whole image when `regions` is empty.
pub fn face_mask(width: u32, height: u32, regions: &[FaceRegion]) -> Vec<f32> {
    let len = width as usize * height as usize;
    if regions.is_empty() {
        return vec![1.0; len];
    }
    let mut mask = vec![0.0f32; len];
    for region in regions {
        let Some(r) = region.clamp_to(width, height) else {
            continue;
        };
        let feather = (r.width.min(r.height) as f32 / 8.0).max(1.0);
        for y in r.y..r.y + r.height {
            for x in r.x..r.x + r.width {
                let edge = (x - r.x)
                    .min(r.x + r.width - 1 - x)
                    .min(y - r.y)
                    .min(r.y + r.height - 1 - y) as f32;
                let weight = ((edge + 1.0) / feather).min(1.0);
                let idx = y as usize * width as usize + x as usize;
                mask[idx] = mask[idx].max(weight);
            }
        }
    }
    mask
}

/// Edge-preserving smoothing blended into the face regions.
pub fn smooth_skin(image: &RgbImage, smoothing: &SkinSmoothing, regions: &[FaceRegion]) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || smoothing.amount <= 0.0 || smoothing.radius == 0 {
        return image.clone();
    }
    let mask = face_mask(width, height, regions);
    let filtered = bilateral_filter(image, smoothing, &mask);
    let amount = smoothing.amount.clamp(0.0, 1.0);

    let mut out = image.clone();
    for (idx, (px, smooth)) in out.pixels_mut().zip(filtered.pixels()).enumerate() {
        let weight = mask[idx] * amount;
        if weight <= 0.0 {
            continue;
        }
        for c in 0..3 {
            let blended = px[c] as f32 * (1.0 - weight) + smooth[c] as f32 * weight;
            px[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Bilateral filter evaluated only where `mask` is positive; other pixels are copied.
///
/// Color distance is the L1 distance over the three channels.
fn bilateral_filter(image: &RgbImage, smoothing: &SkinSmoothing, mask: &[f32]) -> RgbImage {
    let (width, height) = image.dimensions();
    let radius = smoothing.radius as i64;
    let space_coeff = -0.5 / (smoothing.sigma_space.max(EPSILON) * smoothing.sigma_space.max(EPSILON));
    let color_coeff = -0.5 / (smoothing.sigma_color.max(EPSILON) * smoothing.sigma_color.max(EPSILON));

    let mut offsets = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let dist2 = (dx * dx + dy * dy) as f32;
            if dist2 > (radius * radius) as f32 {
                continue;
            }
            offsets.push((dx, dy, (dist2 * space_coeff).exp()));
        }
    }
    let color_weights: Vec<f32> = (0..=255 * 3)
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect();

    let mut out = image.clone();
    for y in 0..height {
        for x in 0..width {
            if mask[y as usize * width as usize + x as usize] <= 0.0 {
                continue;
            }
            let center = image.get_pixel(x, y).0;
            let mut sum = [0.0f32; 3];
            let mut weight_sum = 0.0f32;
            for &(dx, dy, space_weight) in &offsets {
                let nx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                let ny = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                let sample = image.get_pixel(nx, ny).0;
                let diff: usize = (0..3)
                    .map(|c| (sample[c] as i32 - center[c] as i32).unsigned_abs() as usize)
                    .sum();
                let weight = space_weight * color_weights[diff];
                for c in 0..3 {
                    sum[c] += sample[c] as f32 * weight;
                }
                weight_sum += weight;
            }
            if weight_sum > 0.0 {
                out.put_pixel(
                    x,
                    y,
                    image::Rgb(sum.map(|v| (v / weight_sum).round().clamp(0.0, 255.0) as u8)),
                );
            }
        }
    }
    out
}

/// Lift saturation on the eye band (20-45 % of face height) and lip band (60-85 %).
pub fn boost_facial_features(image: &RgbImage, regions: &[FaceRegion]) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    for region in regions {
        let Some(r) = region.clamp_to(width, height) else {
            continue;
        };
        for (start, end, delta) in [(0.20, 0.45, 10.0), (0.60, 0.85, 20.0)] {
            let y0 = region.y + (region.height as f32 * start) as u32;
            let y1 = (region.y + (region.height as f32 * end) as u32).min(height);
            for y in y0..y1 {
                for x in r.x..r.x + r.width {
                    let px = out.get_pixel_mut(x, y);
                    px.0 = boost_saturation(px.0, delta);
                }
            }
        }
    }
    out
}

/// Scale each channel by `0.7 * mean(target)/mean(source) + 0.3`.
pub fn correct_color(image: &RgbImage, source_mean: [f32; 3], target_mean: [f32; 3]) -> RgbImage {
    let factors: [f32; 3] = std::array::from_fn(|c| {
        let ratio = if source_mean[c] > 0.0 {
            target_mean[c] / source_mean[c]
        } else {
            1.0
        };
        ratio * 0.7 + 0.3
    });
    if factors.iter().all(|f| (f - 1.0).abs() < EPSILON) {
        return image.clone();
    }
    let mut out = image.clone();
    for px in out.pixels_mut() {
        for c in 0..3 {
            px[c] = (px[c] as f32 * factors[c]).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Local contrast on lightness (CLAHE in Lab) followed by a saturation lift.
pub fn tone_map(image: &RgbImage, tone: &ToneMapping) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let labs: Vec<[f32; 3]> = image.pixels().map(|px| rgb_to_lab(px.0)).collect();
    let lightness: Vec<u8> = labs
        .iter()
        .map(|lab| (lab[0] * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8)
        .collect();
    let equalized = clahe(&lightness, width, height, tone.clip_limit, tone.tiles);

    let mut out = image.clone();
    for ((px, lab), l) in out.pixels_mut().zip(&labs).zip(&equalized) {
        let rgb = lab_to_rgb([*l as f32 * 100.0 / 255.0, lab[1], lab[2]]);
        px.0 = boost_saturation(rgb, tone.saturation_boost);
    }
    out
}

/// Contrast limited adaptive histogram equalization of a single 8-bit channel.
///
/// The image is split into `tiles` x `tiles` blocks; each block gets a clipped equalization
/// lookup table and pixels interpolate bilinearly between the tables of the nearest blocks.
pub fn clahe(channel: &[u8], width: u32, height: u32, clip_limit: f32, tiles: u32) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 || channel.len() < w * h {
        return channel.to_vec();
    }
    let tiles = tiles.max(1) as usize;
    let tile_w = w.div_ceil(tiles).max(1);
    let tile_h = h.div_ceil(tiles).max(1);
    let nx = w.div_ceil(tile_w);
    let ny = h.div_ceil(tile_h);

    let mut luts = vec![[0u8; 256]; nx * ny];
    for ty in 0..ny {
        for tx in 0..nx {
            let (x0, x1) = (tx * tile_w, ((tx + 1) * tile_w).min(w));
            let (y0, y1) = (ty * tile_h, ((ty + 1) * tile_h).min(h));
            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for &v in &channel[y * w + x0..y * w + x1] {
                    hist[v as usize] += 1;
                }
            }
            let area = ((x1 - x0) * (y1 - y0)) as u32;
            luts[ty * nx + tx] = clipped_equalization_lut(&mut hist, area, clip_limit);
        }
    }

    let mut out = vec![0u8; w * h];
    for y in 0..h {
        let (ty0, ty1, ay) = tile_neighbours((y as f32 + 0.5) / tile_h as f32 - 0.5, ny);
        for x in 0..w {
            let (tx0, tx1, ax) = tile_neighbours((x as f32 + 0.5) / tile_w as f32 - 0.5, nx);
            let v = channel[y * w + x] as usize;
            let top = luts[ty0 * nx + tx0][v] as f32 * (1.0 - ax) + luts[ty0 * nx + tx1][v] as f32 * ax;
            let bottom =
                luts[ty1 * nx + tx0][v] as f32 * (1.0 - ax) + luts[ty1 * nx + tx1][v] as f32 * ax;
            out[y * w + x] = (top * (1.0 - ay) + bottom * ay).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

fn tile_neighbours(pos: f32, count: usize) -> (usize, usize, f32) {
    if pos <= 0.0 {
        return (0, 0, 0.0);
    }
    let first = pos.floor() as usize;
    if first + 1 >= count {
        return (count - 1, count - 1, 0.0);
    }
    (first, first + 1, pos - first as f32)
}

fn identity_lut() -> [u8; 256] {
    std::array::from_fn(|i| i as u8)
}

fn clipped_equalization_lut(hist: &mut [u32; 256], area: u32, clip_limit: f32) -> [u8; 256] {
    if area == 0 {
        return identity_lut();
    }

    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
        let mut excess = 0u32;
        for bin in hist.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }
        let share = excess / 256;
        let mut residual = excess % 256;
        for bin in hist.iter_mut() {
            *bin += share;
        }
        if residual > 0 {
            let step = (256 / residual as usize).max(1);
            for bin in hist.iter_mut().step_by(step) {
                if residual == 0 {
                    break;
                }
                *bin += 1;
                residual -= 1;
            }
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; 256];
    let mut cumulative = 0u32;
    for (slot, count) in lut.iter_mut().zip(hist.iter()) {
        cumulative += count;
        *slot = (cumulative as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::rgb_to_hsv;
    use image::Rgb;

    fn solid(color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb(color))
    }

    fn portrait() -> RgbImage {
        RgbImage::from_fn(48, 40, |x, y| {
            let noise = ((x * 37 + y * 91) % 17) as u8;
            Rgb([150 + noise, 110 + (y as u8 % 30), 90 + (x as u8 % 40)])
        })
    }

    #[test]
    fn basic_quality_returns_input_unchanged() {
        let img = portrait();
        let ctx = EnhanceContext::from_images(&solid([10, 20, 30]), &solid([200, 180, 160]), vec![]);
        let out = enhance_for_quality(&img, QualityLevel::Basic, &ctx);
        assert_eq!(out, img);
    }

    #[test]
    fn quality_presets_follow_the_enhancement_table() {
        let basic = EnhancementSettings::for_quality(QualityLevel::Basic);
        assert!(basic.is_noop());

        let hd = EnhancementSettings::for_quality(QualityLevel::Hd);
        assert_eq!(hd.detail, Some(DetailFinish::default()));
        assert_eq!(hd.skin_smoothing, Some(SkinSmoothing::LIGHT));
        assert!(hd.feature_boost);
        assert!(hd.color_correction);
        assert_eq!(hd.tone_mapping, None);

        let ultra = EnhancementSettings::for_quality(QualityLevel::UltraHd);
        assert_eq!(ultra.detail, Some(DetailFinish::default()));
        assert_eq!(ultra.skin_smoothing, Some(SkinSmoothing::STRONG));
        assert!(ultra.feature_boost);
        assert!(ultra.color_correction);
        assert_eq!(ultra.tone_mapping, Some(ToneMapping::default()));
    }

    #[test]
    fn preset_strengths_match_the_enhancement_table() {
        assert_eq!(
            (SkinSmoothing::LIGHT.radius, SkinSmoothing::LIGHT.sigma_color),
            (3, 20.0)
        );
        assert_eq!(
            (SkinSmoothing::STRONG.radius, SkinSmoothing::STRONG.sigma_color),
            (5, 35.0)
        );
        assert!(SkinSmoothing::STRONG.amount > SkinSmoothing::LIGHT.amount);
        let tone = ToneMapping::default();
        assert_eq!((tone.clip_limit, tone.tiles, tone.saturation_boost), (2.0, 8, 10.0));
    }

    #[test]
    fn only_ultra_hd_remaps_lightness() {
        // Black survives every HD step unchanged, so any lightness shift comes from CLAHE.
        let img = RgbImage::new(48, 40);
        let ctx = EnhanceContext::default();
        let lightness_histogram = |image: &RgbImage| {
            let mut hist = [0u32; 101];
            for px in image.pixels() {
                hist[rgb_to_lab(px.0)[0].round().clamp(0.0, 100.0) as usize] += 1;
            }
            hist
        };
        let original = lightness_histogram(&img);

        let hd = enhance_for_quality(&img, QualityLevel::Hd, &ctx);
        assert_eq!(lightness_histogram(&hd), original);

        let ultra = enhance_for_quality(&img, QualityLevel::UltraHd, &ctx);
        assert_ne!(lightness_histogram(&ultra), original);
        assert_ne!(ultra, hd);
    }

    #[test]
    fn empty_region_list_still_smooths_whole_image() {
        let img = portrait();
        let out = smooth_skin(&img, &SkinSmoothing::STRONG, &[]);
        assert_ne!(out, img);
    }

    #[test]
    fn ultra_hd_changes_pixels_and_keeps_dimensions() {
        let img = portrait();
        let ctx = EnhanceContext {
            face_regions: vec![FaceRegion::new(8, 6, 30, 30)],
            ..EnhanceContext::default()
        };
        let out = enhance_for_quality(&img, QualityLevel::UltraHd, &ctx);
        assert_eq!(out.dimensions(), img.dimensions());
        assert_ne!(out, img);
    }

    #[test]
    fn enhancement_is_deterministic() {
        let img = portrait();
        let ctx = EnhanceContext::from_images(
            &solid([120, 100, 90]),
            &solid([140, 110, 95]),
            vec![FaceRegion::new(4, 4, 24, 24)],
        );
        for quality in QualityLevel::ALL {
            let a = enhance_for_quality(&img, quality, &ctx);
            let b = enhance_for_quality(&img, quality, &ctx);
            assert_eq!(a, b, "{quality} not deterministic");
        }
    }

    #[test]
    fn contrast_multiplier_expands_range() {
        let mut img = RgbImage::from_pixel(4, 1, Rgb([128, 128, 128]));
        img.put_pixel(0, 0, Rgb([80, 80, 80]));
        img.put_pixel(3, 0, Rgb([180, 180, 180]));
        let out = apply_contrast(&img, 1.5);
        assert!(out.get_pixel(0, 0)[0] < 80);
        assert!(out.get_pixel(3, 0)[0] > 180);
    }

    #[test]
    fn saturation_zero_grays_image() {
        let out = apply_saturation(&solid([200, 100, 50]), 0.0);
        let px = out.get_pixel(0, 0);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn color_correction_uses_blended_mean_ratio() {
        let out = correct_color(&solid([100, 100, 100]), [100.0, 100.0, 0.0], [200.0, 100.0, 50.0]);
        let px = out.get_pixel(0, 0);
        // ratio 2.0 -> factor 1.7; ratio 1.0 -> unchanged; zero source mean -> unchanged
        assert_eq!(px.0, [170, 100, 100]);
    }

    #[test]
    fn skin_smoothing_stays_inside_face_regions() {
        let img = portrait();
        let region = FaceRegion::new(0, 0, 16, 16);
        let out = smooth_skin(&img, &SkinSmoothing::STRONG, &[region]);
        for y in 0..img.height() {
            for x in 16..img.width() {
                assert_eq!(out.get_pixel(x, y), img.get_pixel(x, y));
            }
        }
        let changed = (4..12)
            .flat_map(|y| (4..12).map(move |x| (x, y)))
            .any(|(x, y)| out.get_pixel(x, y) != img.get_pixel(x, y));
        assert!(changed, "expected smoothing inside the face region");
    }

    #[test]
    fn skin_smoothing_without_regions_covers_whole_image() {
        let mask = face_mask(5, 3, &[]);
        assert_eq!(mask.len(), 15);
        assert!(mask.iter().all(|&m| (m - 1.0).abs() < EPSILON));
    }

    #[test]
    fn feature_boost_targets_eye_and_lip_bands() {
        let img = RgbImage::from_pixel(20, 20, Rgb([180, 120, 100]));
        let out = boost_facial_features(&img, &[FaceRegion::new(0, 0, 20, 20)]);
        let saturation = |px: &Rgb<u8>| rgb_to_hsv(px[0], px[1], px[2]).1;
        let base = saturation(img.get_pixel(0, 0));
        assert_eq!(out.get_pixel(5, 1), img.get_pixel(5, 1));
        assert!(saturation(out.get_pixel(5, 6)) > base);
        assert!(saturation(out.get_pixel(5, 14)) > saturation(out.get_pixel(5, 6)));
        assert_eq!(out.get_pixel(5, 18), img.get_pixel(5, 18));
    }

    #[test]
    fn clahe_stretches_low_contrast_channel() {
        let (w, h) = (32u32, 32u32);
        let channel: Vec<u8> = (0..w * h).map(|i| 100 + (i % w) as u8 / 2).collect();
        let out = clahe(&channel, w, h, 2.0, 8);
        let spread = |v: &[u8]| v.iter().max().unwrap() - v.iter().min().unwrap();
        assert!(spread(&out) > spread(&channel));
    }

    #[test]
    fn face_region_clamps_to_image() {
        let region = FaceRegion::new(10, 10, 50, 50);
        assert_eq!(region.clamp_to(30, 20), Some(FaceRegion::new(10, 10, 20, 10)));
        assert_eq!(FaceRegion::new(40, 0, 5, 5).clamp_to(30, 20), None);
        assert_eq!(FaceRegion::from_box(-4.0, 2.5, 10.0, 8.0), Some(FaceRegion::new(0, 2, 6, 8)));
    }
}
