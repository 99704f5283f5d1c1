//! Decoding of YuNet outputs into [`Face`] records.

use anyhow::Result;
use faceswap_utils::{FaceRegion, FaceSelection, config::DetectionSettings};
use std::cmp::Ordering;
use tract_onnx::prelude::Tensor;

use crate::preprocess::InputSize;

const STRIDES: [usize; 3] = [8, 16, 32];
/// cls, obj, bbox, kps per stride.
pub(crate) const HEAD_OUTPUTS: usize = STRIDES.len() * 4;
/// bbox (4) + landmarks (10) + score (1).
const ROW_LEN: usize = 15;

/// Score filtering and suppression parameters.
#[derive(Debug, Clone)]
pub struct PostprocessConfig {
    pub score_threshold: f32,
    pub nms_threshold: f32,
    /// Candidates kept (highest score first) before suppression. `0` keeps all.
    pub top_k: usize,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        DetectionSettings::default().into()
    }
}

impl From<DetectionSettings> for PostprocessConfig {
    fn from(settings: DetectionSettings) -> Self {
        (&settings).into()
    }
}

impl From<&DetectionSettings> for PostprocessConfig {
    fn from(settings: &DetectionSettings) -> Self {
        PostprocessConfig {
            score_threshold: settings.score_threshold,
            nms_threshold: settings.nms_threshold,
            top_k: settings.top_k,
        }
    }
}

/// Axis-aligned bounding box in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn iou(&self, other: &Self) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        if intersection <= 0.0 {
            return 0.0;
        }

        let union = self.area() + other.area() - intersection;
        if union <= 0.0 { 0.0 } else { intersection / union }
    }

    /// Integer pixel region covered by the box, if any part lies right of / below the origin.
    pub fn region(&self) -> Option<FaceRegion> {
        FaceRegion::from_box(self.x, self.y, self.width, self.height)
    }
}

/// Facial landmark coordinate in image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One detected face.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub bbox: BoundingBox,
    /// Right eye, left eye, nose tip, right mouth corner, left mouth corner (subject's view).
    pub landmarks: [Landmark; 5],
    pub score: f32,
}

impl Face {
    /// Whether the record can drive an alignment: finite landmarks that are not all collapsed
    /// onto one point, and a non-empty box.
    pub fn is_usable(&self) -> bool {
        if !(self.bbox.width > 0.0 && self.bbox.height > 0.0) {
            return false;
        }
        if self
            .landmarks
            .iter()
            .any(|lm| !lm.x.is_finite() || !lm.y.is_finite())
        {
            return false;
        }
        let eye_dx = self.landmarks[0].x - self.landmarks[1].x;
        let eye_dy = self.landmarks[0].y - self.landmarks[1].y;
        (eye_dx * eye_dx + eye_dy * eye_dy).sqrt() > 1.0
    }
}

/// Turn raw detector output into score-filtered, de-duplicated faces ordered left to right.
///
/// `output` is an `[N, 15]` (or `[1, N, 15]`) tensor in the detector input space; coordinates
/// are multiplied by the scale factors to land in the original image.
pub fn apply_postprocess(
    output: &Tensor,
    scale_x: f32,
    scale_y: f32,
    config: &PostprocessConfig,
) -> Result<Vec<Face>> {
    let data = detection_rows(output)?;

    let mut faces: Vec<Face> = data
        .chunks_exact(ROW_LEN)
        .filter(|row| row[14].is_finite() && row[14] >= config.score_threshold)
        .filter_map(|row| {
            let bbox = BoundingBox {
                x: row[0] * scale_x,
                y: row[1] * scale_y,
                width: row[2] * scale_x,
                height: row[3] * scale_y,
            };
            if bbox.width <= 0.0 || bbox.height <= 0.0 {
                return None;
            }
            let landmarks = std::array::from_fn(|i| {
                Landmark::new(row[4 + i * 2] * scale_x, row[5 + i * 2] * scale_y)
            });
            Some(Face {
                bbox,
                landmarks,
                score: row[14],
            })
        })
        .collect();

    faces.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    if config.top_k > 0 && faces.len() > config.top_k {
        faces.truncate(config.top_k);
    }
    if config.nms_threshold > 0.0 && faces.len() > 1 {
        faces = non_max_suppression(faces, config.nms_threshold);
    }

    sort_left_to_right(&mut faces);
    Ok(faces)
}

fn detection_rows(output: &Tensor) -> Result<&[f32]> {
    match output.shape() {
        [_, ROW_LEN] | [1, _, ROW_LEN] => {}
        other => anyhow::bail!(
            "YuNet output must have shape [N, 15] or [1, N, 15] (got {:?})",
            other
        ),
    }
    output
        .as_slice::<f32>()
        .map_err(|e| anyhow::anyhow!("YuNet output is not f32: {e}"))
}

fn non_max_suppression(faces: Vec<Face>, threshold: f32) -> Vec<Face> {
    let mut kept: Vec<Face> = Vec::with_capacity(faces.len());
    for face in faces {
        if kept.iter().all(|k| face.bbox.iou(&k.bbox) <= threshold) {
            kept.push(face);
        }
    }
    kept
}

/// Order faces by the left edge of their bounding box.
pub fn sort_left_to_right(faces: &mut [Face]) {
    faces.sort_by(|a, b| a.bbox.x.partial_cmp(&b.bbox.x).unwrap_or(Ordering::Equal));
}

/// Face with the largest bounding box area.
pub fn largest_face(faces: &[Face]) -> Option<&Face> {
    faces.iter().max_by(|a, b| {
        a.bbox
            .area()
            .partial_cmp(&b.bbox.area())
            .unwrap_or(Ordering::Equal)
    })
}

/// Pick one face according to `selection`. `faces` is expected in left-to-right order.
pub fn select_face(faces: &[Face], selection: FaceSelection) -> Option<&Face> {
    match selection {
        FaceSelection::Leftmost => faces.first(),
        FaceSelection::Largest => largest_face(faces),
        FaceSelection::MostConfident => faces
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal)),
    }
}

/// Fuse the 12 raw YuNet heads (cls, obj, bbox, kps for strides 8/16/32) into `[N, 15]` rows.
///
/// Scores are `sqrt(cls * obj)`; boxes and landmarks are decoded against the anchor grid of
/// each stride in input-space pixels.
pub fn decode_yunet_heads(outputs: &[Tensor], input_size: InputSize) -> Result<Tensor> {
    anyhow::ensure!(
        outputs.len() == HEAD_OUTPUTS,
        "YuNet decode expects {} tensors, got {}",
        HEAD_OUTPUTS,
        outputs.len()
    );

    let pad_w = (input_size.width as usize).div_ceil(32) * 32;
    let pad_h = (input_size.height as usize).div_ceil(32) * 32;

    let mut fused = Vec::new();
    for (si, &stride) in STRIDES.iter().enumerate() {
        let cols = pad_w / stride;
        let rows = pad_h / stride;
        let cells = cols * rows;
        let cls = head_slice(outputs, si, "cls")?;
        let obj = head_slice(outputs, si + STRIDES.len(), "obj")?;
        let bbox = head_slice(outputs, si + STRIDES.len() * 2, "bbox")?;
        let kps = head_slice(outputs, si + STRIDES.len() * 3, "kps")?;
        anyhow::ensure!(
            cls.len() == cells && obj.len() == cells && bbox.len() == cells * 4 && kps.len() == cells * 10,
            "YuNet stride {stride} head sizes do not match a {cols}x{rows} grid"
        );

        let s = stride as f32;
        fused.reserve(cells * ROW_LEN);
        for idx in 0..cells {
            let (col, row) = ((idx % cols) as f32, (idx / cols) as f32);
            let score = (cls[idx].clamp(0.0, 1.0) * obj[idx].clamp(0.0, 1.0)).sqrt();

            let b = &bbox[idx * 4..idx * 4 + 4];
            let (cx, cy) = ((col + b[0]) * s, (row + b[1]) * s);
            let (w, h) = (b[2].exp() * s, b[3].exp() * s);
            fused.extend_from_slice(&[cx - w / 2.0, cy - h / 2.0, w, h]);

            for lm in kps[idx * 10..idx * 10 + 10].chunks_exact(2) {
                fused.push((lm[0] + col) * s);
                fused.push((lm[1] + row) * s);
            }
            fused.push(if score.is_finite() { score } else { 0.0 });
        }
    }

    let rows = fused.len() / ROW_LEN;
    Tensor::from_shape(&[rows, ROW_LEN], &fused)
        .map_err(|e| anyhow::anyhow!("failed to build fused YuNet tensor: {e}"))
}

fn head_slice<'a>(outputs: &'a [Tensor], index: usize, name: &str) -> Result<&'a [f32]> {
    outputs[index]
        .as_slice::<f32>()
        .map_err(|e| anyhow::anyhow!("{name} output not f32: {e}"))
}
