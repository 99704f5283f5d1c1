//! Color-space conversions used by the enhancement filters.
//!
//! HSV follows the usual conventions (hue in degrees, saturation/value 0-1). Lab is CIE L*a*b*
//! relative to D65 with L in 0-100, matching what tone mapping expects.

/// Convert RGB channels (0-255) to HSV (hue in degrees 0-360, saturation/value 0-1).
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let rf = r as f32 / 255.0;
    let gf = g as f32 / 255.0;
    let bf = b as f32 / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let hue = if delta.abs() < f32::EPSILON {
        0.0
    } else if (max - rf).abs() < f32::EPSILON {
        60.0 * (((gf - bf) / delta) % 6.0)
    } else if (max - gf).abs() < f32::EPSILON {
        60.0 * (((bf - rf) / delta) + 2.0)
    } else {
        60.0 * (((rf - gf) / delta) + 4.0)
    };

    let hue = if hue < 0.0 { hue + 360.0 } else { hue };
    let saturation = if max.abs() < f32::EPSILON {
        0.0
    } else {
        delta / max
    };
    (hue, saturation, max)
}

/// Convert HSV (hue in degrees, saturation/value 0-1) to RGB channels (0-255).
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    if s <= 0.0 {
        let val = (v * 255.0).round().clamp(0.0, 255.0) as u8;
        return (val, val, val);
    }

    let hue = if h.is_nan() { 0.0 } else { h.rem_euclid(360.0) };
    let c = v * s;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r1, g1, b1) = match hue {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_byte = |value: f32| -> u8 { ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8 };

    (to_byte(r1), to_byte(g1), to_byte(b1))
}

/// Add `delta` (0-255 scale) to the HSV saturation of a pixel, clamping at full saturation.
///
/// Achromatic pixels keep their gray value since they have no hue to saturate.
pub fn boost_saturation(rgb: [u8; 3], delta: f32) -> [u8; 3] {
    let (h, s, v) = rgb_to_hsv(rgb[0], rgb[1], rgb[2]);
    if s <= 0.0 {
        return rgb;
    }
    let boosted = (s + delta / 255.0).clamp(0.0, 1.0);
    let (r, g, b) = hsv_to_rgb(h, boosted, v);
    [r, g, b]
}

const D65_X: f32 = 0.950_456;
const D65_Z: f32 = 1.088_754;
const LAB_EPSILON: f32 = 0.008_856;
const LAB_KAPPA: f32 = 903.3;

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let v = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

fn lab_f_inv(f: f32) -> f32 {
    let cube = f * f * f;
    if cube > LAB_EPSILON {
        cube
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

/// Convert an sRGB pixel to CIE L*a*b* (L in 0-100).
pub fn rgb_to_lab(rgb: [u8; 3]) -> [f32; 3] {
    let r = srgb_to_linear(rgb[0]);
    let g = srgb_to_linear(rgb[1]);
    let b = srgb_to_linear(rgb[2]);

    let x = (0.412_453 * r + 0.357_580 * g + 0.180_423 * b) / D65_X;
    let y = 0.212_671 * r + 0.715_160 * g + 0.072_169 * b;
    let z = (0.019_334 * r + 0.119_193 * g + 0.950_227 * b) / D65_Z;

    let fx = lab_f(x);
    let fy = lab_f(y);
    let fz = lab_f(z);

    let l = if y > LAB_EPSILON {
        116.0 * fy - 16.0
    } else {
        LAB_KAPPA * y
    };
    [l, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Convert CIE L*a*b* (L in 0-100) back to an sRGB pixel.
pub fn lab_to_rgb(lab: [f32; 3]) -> [u8; 3] {
    let [l, a, b] = lab;
    let y = if l > LAB_KAPPA * LAB_EPSILON {
        ((l + 16.0) / 116.0).powi(3)
    } else {
        l / LAB_KAPPA
    };
    let fy = if y > LAB_EPSILON {
        (l + 16.0) / 116.0
    } else {
        7.787 * y + 16.0 / 116.0
    };
    let x = lab_f_inv(fy + a / 500.0) * D65_X;
    let z = lab_f_inv(fy - b / 200.0) * D65_Z;

    let r = 3.240_479 * x - 1.537_150 * y - 0.498_535 * z;
    let g = -0.969_256 * x + 1.875_992 * y + 0.041_556 * z;
    let bl = 0.055_648 * x - 0.204_043 * y + 1.057_311 * z;

    [linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(bl)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_round_trip_preserves_color() {
        for rgb in [[200u8, 40, 90], [12, 240, 33], [0, 0, 0], [255, 255, 255]] {
            let (h, s, v) = rgb_to_hsv(rgb[0], rgb[1], rgb[2]);
            let (r, g, b) = hsv_to_rgb(h, s, v);
            assert_eq!([r, g, b], rgb);
        }
    }

    #[test]
    fn lab_round_trip_is_within_one_level() {
        for rgb in [[200u8, 40, 90], [12, 240, 33], [128, 128, 128], [250, 220, 190]] {
            let back = lab_to_rgb(rgb_to_lab(rgb));
            for c in 0..3 {
                let diff = (back[c] as i16 - rgb[c] as i16).abs();
                assert!(diff <= 1, "{rgb:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn lab_lightness_spans_black_to_white() {
        assert!(rgb_to_lab([0, 0, 0])[0].abs() < 0.01);
        assert!((rgb_to_lab([255, 255, 255])[0] - 100.0).abs() < 0.1);
    }

    #[test]
    fn saturation_boost_leaves_grays_alone() {
        assert_eq!(boost_saturation([90, 90, 90], 20.0), [90, 90, 90]);
        let boosted = boost_saturation([180, 120, 100], 20.0);
        let (_, before, _) = rgb_to_hsv(180, 120, 100);
        let (_, after, _) = rgb_to_hsv(boosted[0], boosted[1], boosted[2]);
        assert!(after > before);
    }
}
