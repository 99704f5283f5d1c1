use anyhow::Result;
use faceswap_core::{
    BoundingBox, Face, FaceDetector, FaceSwapPipeline, FaceSwapper, Identity, ImageRole, Landmark,
    PipelineOptions, SwapError,
};
use faceswap_utils::{
    EnhanceContext, EnhancementSettings, QualityLevel, enhance, fixture_path, load_fixture_image,
    result_path,
};
use image::{Rgb, RgbImage};
use tempfile::tempdir;

/// Finds `faces` evenly spaced faces in any image that is not a single flat colour.
struct StubDetector {
    faces: usize,
    degenerate: bool,
}

impl StubDetector {
    fn single() -> Self {
        Self {
            faces: 1,
            degenerate: false,
        }
    }
}

fn make_face(x: f32, y: f32, width: f32, height: f32) -> Face {
    Face {
        bbox: BoundingBox {
            x,
            y,
            width,
            height,
        },
        landmarks: [
            Landmark::new(x + width * 0.3, y + height * 0.35),
            Landmark::new(x + width * 0.7, y + height * 0.35),
            Landmark::new(x + width * 0.5, y + height * 0.55),
            Landmark::new(x + width * 0.35, y + height * 0.75),
            Landmark::new(x + width * 0.65, y + height * 0.75),
        ],
        score: 0.95,
    }
}

impl FaceDetector for StubDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Face>> {
        let first = image.get_pixel(0, 0);
        if image.pixels().all(|p| p == first) {
            return Ok(Vec::new());
        }
        let (w, h) = (image.width() as f32, image.height() as f32);
        let column = w / self.faces as f32;
        Ok((0..self.faces)
            .map(|i| {
                let mut face = make_face(
                    column * i as f32 + column * 0.2,
                    h * 0.25,
                    column * 0.6,
                    h * 0.5,
                );
                if self.degenerate {
                    face.landmarks = [Landmark::new(face.bbox.x, face.bbox.y); 5];
                }
                face
            })
            .collect())
    }
}

/// Paints the target face box with the direction of the source face's mean colour.
struct StubSwapper;

impl FaceSwapper for StubSwapper {
    fn identity(&self, source: &RgbImage, face: &Face) -> Result<Identity> {
        let region = face.bbox.region().expect("stub faces have a region");
        let mut sums = [1.0f32; 3];
        for y in region.y..(region.y + region.height).min(source.height()) {
            for x in region.x..(region.x + region.width).min(source.width()) {
                let px = source.get_pixel(x, y);
                for c in 0..3 {
                    sums[c] += px[c] as f32;
                }
            }
        }
        Identity::from_vector(sums.to_vec())
    }

    fn swap(&self, target: &RgbImage, face: &Face, identity: &Identity) -> Result<RgbImage> {
        let color = Rgb(std::array::from_fn(|c| (identity.as_slice()[c] * 255.0) as u8));
        let region = face
            .bbox
            .region()
            .and_then(|r| r.clamp_to(target.width(), target.height()))
            .ok_or_else(|| anyhow::anyhow!("face outside target"))?;
        let mut out = target.clone();
        for y in region.y..region.y + region.height {
            for x in region.x..region.x + region.width {
                out.put_pixel(x, y, color);
            }
        }
        Ok(out)
    }
}

struct FailingSwapper;

impl FaceSwapper for FailingSwapper {
    fn identity(&self, _source: &RgbImage, _face: &Face) -> Result<Identity> {
        Identity::from_vector(vec![1.0, 0.0, 0.0])
    }

    fn swap(&self, _target: &RgbImage, _face: &Face, _identity: &Identity) -> Result<RgbImage> {
        anyhow::bail!("generator exploded")
    }
}

fn pipeline_with(detector: StubDetector, options: PipelineOptions) -> FaceSwapPipeline {
    FaceSwapPipeline::new(Box::new(detector), Box::new(StubSwapper), options)
}

fn stub_pipeline() -> FaceSwapPipeline {
    pipeline_with(StubDetector::single(), PipelineOptions::default())
}

fn target_image() -> RgbImage {
    RgbImage::from_fn(120, 96, |x, y| Rgb([(x * 2) as u8, (y * 2) as u8, 128]))
}

fn source_image() -> RgbImage {
    RgbImage::from_fn(80, 80, |x, y| Rgb([200, (x + y) as u8, 60]))
}

#[test]
fn output_matches_target_dimensions_at_every_quality() {
    let pipeline = stub_pipeline();
    let (source, target) = (source_image(), target_image());
    for quality in QualityLevel::ALL {
        let outcome = pipeline.process(&source, &target, quality).unwrap();
        assert_eq!(outcome.image.dimensions(), target.dimensions(), "{quality}");
        assert_eq!(outcome.quality, quality);
        assert_eq!((outcome.source_faces.len(), outcome.target_faces.len()), (1, 1));
    }
}

#[test]
fn basic_quality_returns_the_raw_swap() {
    let pipeline = stub_pipeline();
    let (source, target) = (source_image(), target_image());

    let detector = StubDetector::single();
    let source_face = detector.detect(&source).unwrap().remove(0);
    let target_face = detector.detect(&target).unwrap().remove(0);
    let identity = StubSwapper.identity(&source, &source_face).unwrap();
    let raw = StubSwapper.swap(&target, &target_face, &identity).unwrap();

    let outcome = pipeline
        .process(&source, &target, QualityLevel::Basic)
        .unwrap();
    assert_eq!(outcome.image, raw);
    assert_ne!(outcome.image, target);
}

#[test]
fn ultra_hd_differs_from_basic() {
    let pipeline = stub_pipeline();
    let (source, target) = (source_image(), target_image());
    let basic = pipeline
        .process(&source, &target, QualityLevel::Basic)
        .unwrap();
    let ultra = pipeline
        .process(&source, &target, QualityLevel::UltraHd)
        .unwrap();
    assert_ne!(basic.image, ultra.image);
}

#[test]
fn blank_canvas_reports_missing_face_for_either_role() {
    let pipeline = stub_pipeline();
    let blank = load_fixture_image("images/blank_canvas.png").unwrap();

    let err = pipeline
        .process(&source_image(), &blank, QualityLevel::Hd)
        .unwrap_err();
    assert!(matches!(
        err,
        SwapError::NoFaceDetected {
            role: ImageRole::Target
        }
    ));

    let err = pipeline
        .process(&blank, &target_image(), QualityLevel::Hd)
        .unwrap_err();
    assert!(matches!(
        err,
        SwapError::NoFaceDetected {
            role: ImageRole::Source
        }
    ));
}

#[test]
fn repeated_runs_are_identical() {
    let pipeline = stub_pipeline();
    let (source, target) = (source_image(), target_image());
    for quality in [QualityLevel::Hd, QualityLevel::UltraHd] {
        let first = pipeline.process(&source, &target, quality).unwrap();
        let second = pipeline.process(&source, &target, quality).unwrap();
        assert_eq!(first.image, second.image, "{quality}");
    }
}

#[test]
fn undecodable_and_missing_inputs_are_unsupported() {
    let pipeline = stub_pipeline();
    let bogus = fixture_path("images/not_an_image.png").unwrap();
    let good = fixture_path("images/test_pattern.png").unwrap();

    let err = pipeline
        .process_paths(&bogus, &good, QualityLevel::Basic)
        .unwrap_err();
    match err {
        SwapError::UnsupportedFormat { path, .. } => assert_eq!(path, bogus),
        other => panic!("unexpected error: {other}"),
    }

    let missing = good.with_file_name("does_not_exist.png");
    let err = pipeline
        .process_paths(&good, &missing, QualityLevel::Basic)
        .unwrap_err();
    assert!(matches!(err, SwapError::UnsupportedFormat { .. }));
}

#[test]
fn empty_images_are_rejected_before_detection() {
    let pipeline = stub_pipeline();
    let err = pipeline
        .process(&RgbImage::new(0, 0), &target_image(), QualityLevel::Hd)
        .unwrap_err();
    assert!(matches!(err, SwapError::UnsupportedFormat { .. }));
}

#[test]
fn swap_all_faces_touches_every_target_face() {
    let (source, target) = (source_image(), target_image());
    let single = pipeline_with(
        StubDetector {
            faces: 2,
            degenerate: false,
        },
        PipelineOptions::default(),
    );
    let all = pipeline_with(
        StubDetector {
            faces: 2,
            degenerate: false,
        },
        PipelineOptions {
            swap_all_faces: true,
            ..PipelineOptions::default()
        },
    );

    let one = single
        .process(&source, &target, QualityLevel::Basic)
        .unwrap();
    let both = all.process(&source, &target, QualityLevel::Basic).unwrap();
    assert_eq!((one.target_faces.len(), one.swapped_faces), (2, 1));
    assert_eq!((both.target_faces.len(), both.swapped_faces), (2, 2));

    // Right-hand face centre.
    let (rx, ry) = (90, 48);
    assert_eq!(one.image.get_pixel(rx, ry), target.get_pixel(rx, ry));
    assert_ne!(both.image.get_pixel(rx, ry), target.get_pixel(rx, ry));
}

#[test]
fn degenerate_landmarks_fail_the_swap() {
    let pipeline = pipeline_with(
        StubDetector {
            faces: 1,
            degenerate: true,
        },
        PipelineOptions::default(),
    );
    let err = pipeline
        .process(&source_image(), &target_image(), QualityLevel::Hd)
        .unwrap_err();
    assert!(matches!(err, SwapError::SwapFailed(_)));
}

#[test]
fn swapper_errors_become_swap_failed() {
    let pipeline = FaceSwapPipeline::new(
        Box::new(StubDetector::single()),
        Box::new(FailingSwapper),
        PipelineOptions::default(),
    );
    let err = pipeline
        .process(&source_image(), &target_image(), QualityLevel::Hd)
        .unwrap_err();
    match err {
        SwapError::SwapFailed(reason) => assert!(reason.contains("generator exploded")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn results_are_saved_under_the_quality_prefixed_name() {
    let pipeline = stub_pipeline();
    let outcome = pipeline
        .process(&source_image(), &target_image(), QualityLevel::UltraHd)
        .unwrap();

    let dir = tempdir().unwrap();
    let destination = result_path(
        &dir.path().join("nested"),
        QualityLevel::UltraHd,
        std::path::Path::new("photos/beach.jpg"),
        std::path::Path::new("me.png"),
    );
    pipeline.save(&outcome.image, &destination).unwrap();

    assert!(destination.ends_with("ULTRA_HD_beach_with_face_of_me.png"));
    let reloaded = image::open(&destination).unwrap().to_rgb8();
    assert_eq!(reloaded, outcome.image);
}

/// Reports a single face whose box lies entirely left of the image.
struct OffCanvasDetector;

impl FaceDetector for OffCanvasDetector {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<Face>> {
        Ok(vec![make_face(-60.0, 10.0, 40.0, 40.0)])
    }
}

/// Returns the target untouched.
struct PassThroughSwapper;

impl FaceSwapper for PassThroughSwapper {
    fn identity(&self, _source: &RgbImage, _face: &Face) -> Result<Identity> {
        Identity::from_vector(vec![1.0, 0.0, 0.0])
    }

    fn swap(&self, target: &RgbImage, _face: &Face, _identity: &Identity) -> Result<RgbImage> {
        Ok(target.clone())
    }
}

#[test]
fn faces_outside_the_target_do_not_smooth_the_whole_image() {
    let pipeline = FaceSwapPipeline::new(
        Box::new(OffCanvasDetector),
        Box::new(PassThroughSwapper),
        PipelineOptions::default(),
    );
    let (source, target) = (source_image(), target_image());
    let outcome = pipeline
        .process(&source, &target, QualityLevel::UltraHd)
        .unwrap();

    let mut without_smoothing = EnhancementSettings::for_quality(QualityLevel::UltraHd);
    without_smoothing.skin_smoothing = None;
    let ctx = EnhanceContext::from_images(&source, &target, Vec::new());
    assert_eq!(outcome.swapped_faces, 1);
    assert_eq!(outcome.image, enhance(&target, &without_smoothing, &ctx));
}
