//! Face detection, identity extraction and face swapping.
//!
//! The pretrained models (YuNet, ArcFace, inswapper) run through `tract-onnx`. This crate supplies
//! the tensor plumbing around them, landmark alignment, paste-back, and the linear
//! [`FaceSwapPipeline`] that the CLI and GUI drive.

/// Landmark alignment onto the ArcFace template.
pub mod align;
/// Face detection seam and the YuNet implementation.
pub mod detector;
/// User-facing error taxonomy.
pub mod error;
/// ONNX model loading and execution.
pub mod model;
/// Load → detect → swap → enhance → save.
pub mod pipeline;
/// Detection post-processing (NMS, score filtering, face selection).
pub mod postprocess;
/// Image pre-processing for the detector.
pub mod preprocess;
/// ArcFace identity embeddings.
pub mod recognizer;
/// Identity transfer seam and the inswapper implementation.
pub mod swapper;

pub use align::{AlignedFace, SimilarityTransform, align_face};
pub use detector::{FaceDetector, YuNetDetector};
pub use error::{ImageRole, SwapError};
pub use model::OnnxModel;
pub use pipeline::{
    FaceSwapPipeline, ModelPaths, PipelineOptions, SwapOutcome, load_input, save_result,
};
pub use postprocess::{
    BoundingBox, Face, Landmark, PostprocessConfig, apply_postprocess, largest_face, select_face,
};
pub use preprocess::{CpuPreprocessor, InputSize, PreprocessOutput, Preprocessor};
pub use recognizer::ArcFaceRecognizer;
pub use swapper::{FaceSwapper, Identity, InSwapper};

/// Returns the crate version for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
