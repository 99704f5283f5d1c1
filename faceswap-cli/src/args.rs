//! Command-line argument definitions for faceswap-cli.

use clap::{ArgAction, Parser};
use faceswap_utils::{FaceSelection, QualityLevel};
use std::path::PathBuf;

/// Swap the face from a source image onto the face in a target image.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct SwapArgs {
    /// Image providing the face (identity) to use.
    #[arg(short, long)]
    pub source: PathBuf,

    /// Image whose face is replaced.
    #[arg(short, long)]
    pub target: PathBuf,

    /// Output file. Defaults to `{QUALITY}_{target}_with_face_of_{source}.png` in the output
    /// directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Quality level: basic, hd, ultra-hd (or 1, 2, 3). Defaults to the settings file, then hd.
    #[arg(short, long, value_name = "LEVEL")]
    pub quality: Option<QualityLevel>,

    /// Show detailed progress.
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Optional settings JSON. Defaults to `config/faceswap_settings.json` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the pretrained models.
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Detector model file name or path.
    #[arg(long, value_name = "FILE")]
    pub detector_model: Option<String>,

    /// Recognizer model file name or path.
    #[arg(long, value_name = "FILE")]
    pub recognizer_model: Option<String>,

    /// Swap generator model file name or path.
    #[arg(long, value_name = "FILE")]
    pub swapper_model: Option<String>,

    /// Directory for results when `--output` is not given.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Apply the source face to every face found in the target.
    #[arg(long, action = ArgAction::SetTrue)]
    pub all_faces: bool,

    /// Which face to use when several are found: leftmost, largest, most-confident.
    #[arg(long, value_name = "MODE")]
    pub face_selection: Option<FaceSelection>,

    /// Override the detector score threshold.
    #[arg(long)]
    pub score_threshold: Option<f32>,

    /// Write copies of both inputs with detected boxes and landmarks drawn into this directory.
    #[arg(long, value_name = "DIR")]
    pub annotate: Option<PathBuf>,

    /// Enable telemetry timing logs (defaults to settings file).
    #[arg(long, action = ArgAction::SetTrue)]
    pub telemetry: bool,

    /// Override telemetry logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub telemetry_level: Option<String>,
}
