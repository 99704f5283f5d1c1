//! Tests against the real pretrained models. They skip unless `FACESWAP_MODELS_DIR` (or a
//! `models/` directory in the workspace) holds all three default models.

use faceswap_core::{FaceSwapPipeline, ImageRole, SwapError};
use faceswap_utils::{AppSettings, QualityLevel, fixture_path, load_fixture_image, models_dir};

fn pipeline_or_skip() -> Option<FaceSwapPipeline> {
    let Some(dir) = models_dir() else {
        eprintln!("skipping: pretrained models not available");
        return None;
    };
    let mut settings = AppSettings::default();
    settings.models.directory = dir;
    Some(FaceSwapPipeline::from_settings(&settings).expect("models should load"))
}

#[test]
fn real_detector_finds_nothing_on_a_blank_canvas() {
    let Some(pipeline) = pipeline_or_skip() else {
        return;
    };
    let blank = load_fixture_image("images/blank_canvas.png").unwrap();
    let err = pipeline
        .process(&blank, &blank, QualityLevel::Basic)
        .unwrap_err();
    assert!(matches!(
        err,
        SwapError::NoFaceDetected {
            role: ImageRole::Source
        }
    ));
}

#[test]
fn real_swap_preserves_target_dimensions() {
    let Some(pipeline) = pipeline_or_skip() else {
        return;
    };
    let (Ok(source), Ok(target)) = (
        fixture_path("images/face_source.jpg"),
        fixture_path("images/face_target.jpg"),
    ) else {
        eprintln!("skipping: face photographs not present in fixtures/images");
        return;
    };

    let target_image = image::open(&target).unwrap();
    let target_dims = (target_image.width(), target_image.height());
    for quality in QualityLevel::ALL {
        let outcome = pipeline.process_paths(&source, &target, quality).unwrap();
        assert_eq!(outcome.image.dimensions(), target_dims);
    }
}
