//! Shared configuration types consumed by the CLI and GUI front-ends.
//!
//! Every section is `#[serde(default)]` so partial JSON files load cleanly and newer fields
//! pick up their defaults.

use crate::{output::OutputOptions, quality::QualityLevel};

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

pub const DEFAULT_DETECTOR_MODEL: &str = "face_detection_yunet_2023mar.onnx";
pub const DEFAULT_RECOGNIZER_MODEL: &str = "w600k_r50.onnx";
pub const DEFAULT_SWAPPER_MODEL: &str = "inswapper_128.onnx";

/// Locations of the three pretrained models.
///
/// File names are resolved against `directory` unless they are absolute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelSettings {
    pub directory: PathBuf,
    pub detector: String,
    pub recognizer: String,
    pub swapper: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("models"),
            detector: DEFAULT_DETECTOR_MODEL.to_string(),
            recognizer: DEFAULT_RECOGNIZER_MODEL.to_string(),
            swapper: DEFAULT_SWAPPER_MODEL.to_string(),
        }
    }
}

impl ModelSettings {
    fn resolve(&self, name: &str) -> PathBuf {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.directory.join(candidate)
        }
    }

    pub fn detector_path(&self) -> PathBuf {
        self.resolve(&self.detector)
    }

    pub fn recognizer_path(&self) -> PathBuf {
        self.resolve(&self.recognizer)
    }

    pub fn swapper_path(&self) -> PathBuf {
        self.resolve(&self.swapper)
    }
}

/// Detector input resolution in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputDimensions {
    pub width: u32,
    pub height: u32,
}

impl Default for InputDimensions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 640,
        }
    }
}

/// Detection post-processing parameters mirroring YuNet defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionSettings {
    /// Minimum confidence score for a detection to be considered valid.
    pub score_threshold: f32,
    /// IoU threshold for non-maximum suppression.
    pub nms_threshold: f32,
    /// Maximum number of candidates kept before suppression.
    pub top_k: usize,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            score_threshold: 0.9,
            nms_threshold: 0.3,
            top_k: 5_000,
        }
    }
}

/// Which detected face is used when an image contains several.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FaceSelection {
    /// First face in left-to-right order.
    #[default]
    Leftmost,
    /// Face with the largest bounding box area.
    Largest,
    /// Face with the highest detector score.
    MostConfident,
}

impl FaceSelection {
    pub const ALL: [FaceSelection; 3] = [
        FaceSelection::Leftmost,
        FaceSelection::Largest,
        FaceSelection::MostConfident,
    ];

    pub fn as_label(self) -> &'static str {
        match self {
            FaceSelection::Leftmost => "Leftmost",
            FaceSelection::Largest => "Largest",
            FaceSelection::MostConfident => "Most confident",
        }
    }
}

impl fmt::Display for FaceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FaceSelection::Leftmost => "leftmost",
            FaceSelection::Largest => "largest",
            FaceSelection::MostConfident => "most-confident",
        })
    }
}

impl FromStr for FaceSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "leftmost" | "first" => Ok(FaceSelection::Leftmost),
            "largest" => Ok(FaceSelection::Largest),
            "most-confident" | "confidence" => Ok(FaceSelection::MostConfident),
            other => Err(format!(
                "invalid face selection '{other}'; expected leftmost, largest or most-confident"
            )),
        }
    }
}

/// How faces are picked and replaced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SwapSettings {
    /// Face taken from the source image and (unless `swap_all_faces`) replaced in the target.
    pub face_selection: FaceSelection,
    /// Replace every detected target face with the source identity.
    pub swap_all_faces: bool,
}

/// Where and how results are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory used when no explicit output file is requested.
    pub directory: PathBuf,
    /// JPEG quality (1-100) for `.jpg` outputs.
    pub jpeg_quality: u8,
    pub png_best_compression: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            jpeg_quality: 95,
            png_best_compression: false,
        }
    }
}

impl OutputSettings {
    pub fn options(&self) -> OutputOptions {
        OutputOptions {
            jpeg_quality: self.jpeg_quality,
            png_best_compression: self.png_best_compression,
        }
    }
}

/// Settings controlling optional runtime telemetry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Whether telemetry timing logs are enabled.
    pub enabled: bool,
    /// Logging level for telemetry output (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
        }
    }
}

impl TelemetrySettings {
    /// Resolve the configured level string into a `LevelFilter`.
    pub fn level_filter(&self) -> LevelFilter {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Debug,
        }
    }

    pub fn set_level(&mut self, level: LevelFilter) {
        self.level = level.as_str().to_ascii_lowercase();
    }
}

/// Persistent application settings consumed by CLI and GUI front ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppSettings {
    pub models: ModelSettings,
    pub input: InputDimensions,
    pub detection: DetectionSettings,
    pub swap: SwapSettings,
    /// Enhancement preset applied after the swap.
    pub quality: QualityLevel,
    pub output: OutputSettings,
    pub telemetry: TelemetrySettings,
}

impl AppSettings {
    /// Load settings from a JSON file. Missing sections fall back to their defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))?;
        settings.sanitize();
        Ok(settings)
    }

    /// Serialize settings to disk as pretty-printed JSON, creating the parent directory.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }

    /// Clamp values to ranges the pipeline accepts.
    pub fn sanitize(&mut self) {
        self.detection.score_threshold = self.detection.score_threshold.clamp(0.0, 1.0);
        self.detection.nms_threshold = self.detection.nms_threshold.clamp(0.0, 1.0);
        self.output.jpeg_quality = self.output.jpeg_quality.clamp(1, 100);
        if self.input.width == 0 || self.input.height == 0 {
            self.input = InputDimensions::default();
        }
    }
}

/// Default location of persisted settings (`config/faceswap_settings.json`).
pub fn default_settings_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("config/faceswap_settings.json"))
        .unwrap_or_else(|_| PathBuf::from("config/faceswap_settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn default_settings_round_trip() {
        let file = NamedTempFile::new().expect("tempfile");
        let mut settings = AppSettings::default();
        settings.quality = QualityLevel::UltraHd;
        settings.swap.face_selection = FaceSelection::Largest;
        settings.save_to_path(file.path()).expect("save");

        let loaded = AppSettings::load_from_path(file.path()).expect("load");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let file = NamedTempFile::new().expect("tempfile");
        let json = r#"{
            "models": { "directory": "/opt/faceswap" },
            "detection": { "score_threshold": 0.8, "top_k": 123 },
            "quality": "basic"
        }"#;
        fs::write(file.path(), json).expect("write custom settings");

        let loaded = AppSettings::load_from_path(file.path()).expect("load");
        assert_eq!(loaded.detection.top_k, 123);
        assert_eq!(loaded.detection.nms_threshold, 0.3);
        assert_eq!(loaded.quality, QualityLevel::Basic);
        assert_eq!(
            loaded.models.swapper_path(),
            Path::new("/opt/faceswap").join(DEFAULT_SWAPPER_MODEL)
        );
        assert_eq!(loaded.input, InputDimensions::default());
        assert_eq!(loaded.telemetry.level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn absolute_model_names_bypass_directory() {
        let models = ModelSettings {
            detector: "/srv/yunet.onnx".into(),
            ..ModelSettings::default()
        };
        assert_eq!(models.detector_path(), Path::new("/srv/yunet.onnx"));
        assert_eq!(
            models.recognizer_path(),
            Path::new("models").join(DEFAULT_RECOGNIZER_MODEL)
        );
    }

    #[test]
    fn save_creates_missing_config_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config/faceswap_settings.json");
        AppSettings::default().save_to_path(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn face_selection_parses_aliases() {
        assert_eq!("Largest".parse::<FaceSelection>(), Ok(FaceSelection::Largest));
        assert_eq!("most_confident".parse::<FaceSelection>(), Ok(FaceSelection::MostConfident));
        assert!("random".parse::<FaceSelection>().is_err());
        for mode in FaceSelection::ALL {
            assert_eq!(mode.to_string().parse::<FaceSelection>(), Ok(mode));
        }
    }

    #[test]
    fn telemetry_level_parses_variants() {
        let telemetry = TelemetrySettings {
            level: "Warn".into(),
            ..TelemetrySettings::default()
        };
        assert_eq!(telemetry.level_filter(), LevelFilter::Warn);

        let mut telemetry = TelemetrySettings::default();
        telemetry.set_level(LevelFilter::Info);
        assert_eq!(telemetry.level, "info");
    }
}
