//! Result image export: format selection, encoding and file naming.

use crate::quality::QualityLevel;

use anyhow::{Context, Result};
use image::{
    ExtendedColorType, ImageEncoder, RgbImage,
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
        webp::WebPEncoder,
    },
};
use log::{debug, warn};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Image formats the exporter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormatHint {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormatHint {
    /// Determine format from a filesystem extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        ext.parse().ok()
    }

    /// Format implied by `path`, falling back to PNG for unknown or missing extensions.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => Self::from_extension(ext).unwrap_or_else(|| {
                warn!(
                    "Unsupported output extension '{}' for {}; encoding as PNG",
                    ext,
                    path.display()
                );
                Self::Png
            }),
            None => Self::Png,
        }
    }
}

impl std::str::FromStr for ImageFormatHint {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            other => Err(format!("unknown image format '{other}'")),
        }
    }
}

/// Encoder tuning for exported results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
    /// Use maximum PNG compression instead of the default level.
    pub png_best_compression: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            png_best_compression: false,
        }
    }
}

/// Encode `image` according to the extension of `destination` and write it, creating parent
/// directories as needed. Returns the format that was written.
pub fn save_rgb_image(
    image: &RgbImage,
    destination: &Path,
    options: &OutputOptions,
) -> Result<ImageFormatHint> {
    if let Some(parent) = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && !p.exists())
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let format = ImageFormatHint::for_path(destination);
    debug!(
        "Saving result to {} using {:?} format",
        destination.display(),
        format
    );

    let encoded = match format {
        ImageFormatHint::Png => encode_png(image, options.png_best_compression)?,
        ImageFormatHint::Jpeg => encode_jpeg(image, options.jpeg_quality)?,
        ImageFormatHint::Webp => encode_webp(image)?,
    };

    write_bytes(destination, &encoded)?;
    Ok(format)
}

/// File name for a swap result: `{PREFIX}_{target}_with_face_of_{source}.png`.
pub fn result_file_name(quality: QualityLevel, target: &Path, source: &Path) -> String {
    format!(
        "{}_{}_with_face_of_{}.png",
        quality.file_prefix(),
        file_stem_or(target, "target"),
        file_stem_or(source, "source")
    )
}

/// Full result path inside `output_dir`.
pub fn result_path(
    output_dir: &Path,
    quality: QualityLevel,
    target: &Path,
    source: &Path,
) -> PathBuf {
    output_dir.join(result_file_name(quality, target, source))
}

fn file_stem_or<'a>(path: &'a Path, fallback: &'a str) -> std::borrow::Cow<'a, str> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or(std::borrow::Cow::Borrowed(fallback))
}

fn encode_png(image: &RgbImage, best: bool) -> Result<Vec<u8>> {
    let compression = if best {
        CompressionType::Best
    } else {
        CompressionType::Default
    };
    let mut buffer = Vec::new();
    PngEncoder::new_with_quality(&mut buffer, compression, FilterType::Adaptive)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .context("failed to encode PNG")?;
    Ok(buffer)
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .context("failed to encode JPEG")?;
    Ok(buffer)
}

fn encode_webp(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .context("failed to encode WebP")?;
    Ok(buffer)
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}
