use std::path::Path;

use crate::{
    foundation::core::{Canvas, MISSING_POINT, Point, Vec2, is_finite_point},
    foundation::error::{MannequinError, MannequinResult},
    rig::joint::{JOINT_COUNT, Joint, LR_PAIRS},
};

/// Boundary (serde) form of a pose document.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PoseDocumentDef {
    /// Source video `[width, height]` the coordinates are expressed in.
    pub video_size: [f64; 2],
    /// Source video frame rate.
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Frame step the extractor used when sampling the source video.
    #[serde(default = "default_stride")]
    pub stride: u32,
    /// Sampled frames.
    pub frames: Vec<PoseFrameDef>,
}

/// Boundary form of one sampled frame.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PoseFrameDef {
    /// Keypoints as `[x, y]`, `null`, or `[null, null]`.
    pub kps: Vec<Option<[Option<f64>; 2]>>,
    /// Source frame index, informational.
    #[serde(default)]
    pub frame_index: Option<u64>,
    /// Source timestamp in seconds, informational.
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Per-joint detector confidence, informational.
    #[serde(default)]
    pub conf: Option<Vec<Option<f64>>>,
}

fn default_fps() -> f64 {
    30.0
}

fn default_stride() -> u32 {
    1
}

/// One frame of joint positions in reference space; undetected joints are NaN.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseFrame {
    kps: [Point; JOINT_COUNT],
}

impl Default for PoseFrame {
    fn default() -> Self {
        Self {
            kps: [MISSING_POINT; JOINT_COUNT],
        }
    }
}

impl PoseFrame {
    /// Build a frame from explicit points.
    pub fn new(kps: [Point; JOINT_COUNT]) -> Self {
        Self { kps }
    }

    /// Build a frame from optional `[x, y]` pairs; `None` becomes a missing joint.
    pub fn from_options(kps: [Option<[f64; 2]>; JOINT_COUNT]) -> Self {
        Self {
            kps: kps.map(|k| k.map_or(MISSING_POINT, |[x, y]| Point::new(x, y))),
        }
    }

    /// Position of `joint` (NaN when undetected).
    #[inline]
    pub fn joint(&self, joint: Joint) -> Point {
        self.kps[joint.index()]
    }

    /// `true` when `joint` has finite coordinates.
    #[inline]
    pub fn has(&self, joint: Joint) -> bool {
        is_finite_point(self.joint(joint))
    }

    /// `true` when every joint in `joints` is finite.
    pub fn has_all(&self, joints: &[Joint]) -> bool {
        joints.iter().all(|j| self.has(*j))
    }

    /// All keypoints in wire order.
    pub fn points(&self) -> &[Point; JOINT_COUNT] {
        &self.kps
    }

    /// Finite keypoints only.
    pub fn finite_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.kps.iter().copied().filter(|p| is_finite_point(*p))
    }

    /// Exchange left/right limb labels.
    pub fn swap_lr(&self) -> Self {
        let mut out = *self;
        for (l, r) in LR_PAIRS {
            out.kps.swap(l.index(), r.index());
        }
        out
    }

    /// Mirror horizontally inside a reference canvas of width `ref_w` (`x -> ref_w - 1 - x`).
    pub fn hflip(&self, ref_w: u32) -> Self {
        let w = f64::from(ref_w) - 1.0;
        Self {
            kps: self.kps.map(|p| Point::new(w - p.x, p.y)),
        }
    }

    /// Shift every finite joint by `offset`; non-finite joints stay fully NaN.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            kps: self.kps.map(|p| {
                if is_finite_point(p) {
                    p + offset
                } else {
                    MISSING_POINT
                }
            }),
        }
    }
}

/// A loaded pose stream.
#[derive(Clone, Debug)]
pub struct PoseSequence {
    /// Frames in reference space, source order.
    pub frames: Vec<PoseFrame>,
    /// Frame rate of the source video.
    pub source_fps: f64,
    /// Sampling stride the extractor applied.
    pub stride: u32,
}

impl PoseSequence {
    /// Rate at which the stored frames advance: `source_fps / stride`.
    pub fn effective_fps(&self) -> f64 {
        self.source_fps / f64::from(self.stride)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when the sequence has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Read a pose document and rescale it into reference space.
#[tracing::instrument(skip(ref_size), fields(path = %path.display()))]
pub fn load_pose_sequence(path: &Path, ref_size: Canvas) -> MannequinResult<PoseSequence> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| MannequinError::pose_data(format!("read '{}': {e}", path.display())))?;
    let seq = parse_pose_sequence(&text, ref_size)?;
    tracing::info!(
        frames = seq.len(),
        fps = seq.effective_fps(),
        "pose sequence loaded"
    );
    Ok(seq)
}

/// Parse pose document text and rescale it into reference space.
///
/// x and y scale independently by `ref / video`. Missing joints are not errors.
pub fn parse_pose_sequence(text: &str, ref_size: Canvas) -> MannequinResult<PoseSequence> {
    let text = sanitize_non_finite_literals(text);
    let def: PoseDocumentDef = serde_json::from_str(&text)
        .map_err(|e| MannequinError::pose_data(format!("parse pose document: {e}")))?;
    from_def(def, ref_size)
}

/// Validate a parsed document and rescale it.
pub fn from_def(def: PoseDocumentDef, ref_size: Canvas) -> MannequinResult<PoseSequence> {
    let [vw, vh] = def.video_size;
    if !(vw.is_finite() && vh.is_finite() && vw > 0.0 && vh > 0.0) {
        return Err(MannequinError::pose_data(format!(
            "video_size must be positive, got [{vw}, {vh}]"
        )));
    }
    if !def.fps.is_finite() || def.fps <= 0.0 {
        return Err(MannequinError::pose_data(format!(
            "fps must be > 0, got {}",
            def.fps
        )));
    }
    if def.stride == 0 {
        return Err(MannequinError::pose_data("stride must be >= 1"));
    }

    let sx = f64::from(ref_size.width) / vw;
    let sy = f64::from(ref_size.height) / vh;

    let mut frames = Vec::with_capacity(def.frames.len());
    for (i, fr) in def.frames.iter().enumerate() {
        if fr.kps.len() > JOINT_COUNT {
            return Err(MannequinError::pose_data(format!(
                "frame {i} has {} keypoints, expected at most {JOINT_COUNT}",
                fr.kps.len()
            )));
        }
        let mut kps = [MISSING_POINT; JOINT_COUNT];
        for (slot, k) in kps.iter_mut().zip(fr.kps.iter()) {
            if let Some([Some(x), Some(y)]) = k
                && x.is_finite()
                && y.is_finite()
            {
                *slot = Point::new(x * sx, y * sy);
            }
        }
        frames.push(PoseFrame::new(kps));
    }

    Ok(PoseSequence {
        frames,
        source_fps: def.fps,
        stride: def.stride,
    })
}

/// Replace bare `NaN`/`Infinity` tokens (which JSON does not allow) with `null`.
///
/// String contents are left alone.
pub fn sanitize_non_finite_literals(text: &str) -> std::borrow::Cow<'_, str> {
    if !text.contains("NaN") && !text.contains("Infinity") {
        return std::borrow::Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut in_string = false;
    while let Some(c) = rest.chars().next() {
        if in_string {
            out.push(c);
            rest = &rest[c.len_utf8()..];
            if c == '\\' {
                if let Some(esc) = rest.chars().next() {
                    out.push(esc);
                    rest = &rest[esc.len_utf8()..];
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            rest = &rest[1..];
            continue;
        }

        let token = ["-Infinity", "+Infinity", "Infinity", "-NaN", "NaN"]
            .into_iter()
            .find(|t| rest.starts_with(t));
        if let Some(t) = token {
            out.push_str("null");
            rest = &rest[t.len()..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    std::borrow::Cow::Owned(out)
}

#[cfg(test)]
#[path = "../../tests/unit/pose/sequence.rs"]
mod tests;
