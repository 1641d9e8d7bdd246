use std::path::Path;

use crate::{
    effects::composite::{KernelKind, select_kernel},
    foundation::core::{Canvas, Point},
    foundation::error::{MannequinError, MannequinResult},
    foundation::math::perpendicular,
    rig::descriptor::{Rig, VAlignMode},
    rig::part::{AnchorKey, AnchorRef, LIMB_SEGMENTS, LimbSegment, Part, SegmentGroup},
};

/// Asset directory name fragments that select the torso-under-legs draw order.
const ALT_Z_ORDER_PATTERNS: [&str; 2] = ["ren_parts", "rens_parts"];

/// Caller-facing renderer options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOpts {
    /// Extra canvas width added on each side of the reference canvas.
    pub side_pad: u32,
    /// Extra canvas height above the reference canvas, also the `top_pad` alignment offset.
    pub top_pad: i32,
    /// Horizontal offset applied when follow-center is off or the hips are not both visible.
    pub offset_x: i32,
    /// Render every `stride`-th pose frame.
    pub stride: u32,
    /// Mark every finite joint after compositing.
    pub show_debug: bool,
    /// Re-center each frame horizontally on the hip midpoint.
    pub follow_center: bool,
    /// Exchange left/right joint labels before rendering.
    pub swap_lr: bool,
    /// Mirror joints horizontally inside the reference canvas before rendering.
    pub hflip: bool,
    /// Override the worker thread count. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Override the blend strategy. `None` resolves with [`select_kernel`].
    pub kernel: Option<KernelKind>,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            side_pad: 240,
            top_pad: 100,
            offset_x: 0,
            stride: 1,
            show_debug: true,
            follow_center: true,
            swap_lr: true,
            hflip: false,
            threads: None,
            kernel: None,
        }
    }
}

impl RenderOpts {
    /// Reject option values no render can use.
    pub fn validate(&self) -> MannequinResult<()> {
        if self.stride == 0 {
            return Err(MannequinError::validation("stride must be >= 1"));
        }
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(MannequinError::validation("threads must be >= 1 when set"));
        }
        Ok(())
    }
}

/// Output canvas size for a non-native background: the reference canvas widened by `side_pad` on
/// both sides and heightened by a non-negative `top_pad`.
///
/// Fails when the padded size does not fit in `u32`.
pub fn canvas_size(ref_size: Canvas, side_pad: u32, top_pad: i32) -> MannequinResult<Canvas> {
    let width = side_pad
        .checked_mul(2)
        .and_then(|pad| ref_size.width.checked_add(pad));
    let height = ref_size.height.checked_add(top_pad.max(0).unsigned_abs());
    match (width, height) {
        (Some(width), Some(height)) => Ok(Canvas { width, height }),
        _ => Err(MannequinError::validation(format!(
            "canvas of {}x{} padded by side_pad {side_pad} and top_pad {top_pad} is too large",
            ref_size.width, ref_size.height
        ))),
    }
}

/// `true` when the asset directory's name asks for the torso to be drawn before the legs.
pub fn uses_alternate_z_order(assets_dir: &Path) -> bool {
    let name = assets_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    ALT_Z_ORDER_PATTERNS.iter().any(|p| name.contains(p))
}

/// Inputs of the per-frame placement solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementParams {
    /// Output canvas.
    pub canvas: Canvas,
    /// Vertical alignment policy.
    pub v_align: VAlignMode,
    /// Distance kept between the lowest foot-region joint and the canvas bottom (`feet`).
    pub bottom_margin: f64,
    /// Fixed vertical offset (`top_pad` and the no-joints fallback).
    pub top_pad: f64,
    /// Horizontal offset used when follow-center does not apply.
    pub offset_x: f64,
    /// Re-center horizontally on the hip midpoint.
    pub follow_center: bool,
    /// Rest-pose shoulder-to-shoulder distance, never zero.
    pub rest_shoulder_width: f64,
}

/// Rest-pose geometry of one peripheral segment, resolved from the rig once per run.
#[derive(Clone, Copy, Debug)]
pub struct SegmentRest {
    /// Segment definition (sprite, joints, group).
    pub segment: LimbSegment,
    /// Rest-pose start.
    pub p0: Point,
    /// Rest-pose end.
    pub p1: Point,
    /// Synthetic third point, offset perpendicular to the segment by `base_width`.
    pub mid: Point,
    /// Perpendicular offset of `mid`; `0.1 * length`, or `1.0` for a zero-length segment.
    pub base_width: f64,
}

impl SegmentRest {
    fn resolve(rig: &Rig, segment: LimbSegment) -> MannequinResult<Self> {
        let p0 = resolve_anchor(rig, segment.start)?;
        let p1 = resolve_anchor(rig, segment.end)?;
        let v = p1 - p0;
        let len = v.hypot();
        let base_width = if len < 1e-6 { 1.0 } else { len * 0.1 };
        let perp = perpendicular(v / (len + 1e-6));
        let mid = p0.midpoint(p1) + perp * base_width;
        Ok(Self {
            segment,
            p0,
            p1,
            mid,
            base_width,
        })
    }
}

/// Rest-pose torso correspondence points.
#[derive(Clone, Copy, Debug)]
pub struct TorsoRest {
    /// `anchors[body>left_upper_arm].parent`.
    pub left_shoulder: Point,
    /// `anchors[body>right_upper_arm].parent`.
    pub right_shoulder: Point,
    /// Midpoint of both `anchors[*_upper_leg>body].parent`.
    pub hip_center: Point,
}

/// Immutable per-run render configuration shared by every job.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Output canvas.
    pub canvas: Canvas,
    /// Reference canvas of the rig.
    pub ref_size: Canvas,
    /// Placement solver inputs.
    pub placement: PlacementParams,
    /// Torso geometry.
    pub torso: TorsoRest,
    /// Peripheral segments in draw order within their group.
    pub segments: Vec<SegmentRest>,
    /// Draw the torso before the legs.
    pub alt_z_order: bool,
    /// Draw joint markers.
    pub show_debug: bool,
    /// Blend strategy.
    pub kernel: KernelKind,
}

impl RenderConfig {
    /// Resolve all rig geometry the compositor needs for a run on `canvas`.
    pub fn new(
        rig: &Rig,
        assets_dir: &Path,
        opts: &RenderOpts,
        canvas: Canvas,
    ) -> MannequinResult<Self> {
        opts.validate()?;

        let left_shoulder = rig
            .anchor(AnchorKey(Part::Body, Part::LeftUpperArm))?
            .parent;
        let right_shoulder = rig
            .anchor(AnchorKey(Part::Body, Part::RightUpperArm))?
            .parent;
        let left_hip = rig
            .anchor(AnchorKey(Part::LeftUpperLeg, Part::Body))?
            .parent;
        let right_hip = rig
            .anchor(AnchorKey(Part::RightUpperLeg, Part::Body))?
            .parent;

        let segments = LIMB_SEGMENTS
            .iter()
            .map(|s| SegmentRest::resolve(rig, *s))
            .collect::<MannequinResult<Vec<_>>>()?;

        Ok(Self {
            canvas,
            ref_size: rig.ref_size,
            placement: PlacementParams {
                canvas,
                v_align: rig.options.v_align_mode,
                bottom_margin: rig.options.bottom_margin_px,
                top_pad: f64::from(opts.top_pad),
                offset_x: f64::from(opts.offset_x),
                follow_center: opts.follow_center,
                rest_shoulder_width: (left_shoulder - right_shoulder).hypot() + 1e-6,
            },
            torso: TorsoRest {
                left_shoulder,
                right_shoulder,
                hip_center: left_hip.midpoint(right_hip),
            },
            segments,
            alt_z_order: uses_alternate_z_order(assets_dir),
            show_debug: opts.show_debug,
            kernel: opts.kernel.unwrap_or_else(select_kernel),
        })
    }

    /// Segments of `group`, in draw order.
    pub fn group(&self, group: SegmentGroup) -> impl Iterator<Item = &SegmentRest> {
        self.segments.iter().filter(move |s| s.segment.group == group)
    }
}

fn resolve_anchor(rig: &Rig, at: AnchorRef) -> MannequinResult<Point> {
    Ok(match at {
        AnchorRef::Parent(key) => rig.anchor(key)?.parent,
        AnchorRef::Child(key) => rig.anchor(key)?.child,
        AnchorRef::Tip(part) => rig.tip(part)?,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
