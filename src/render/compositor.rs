use image::{Rgb, RgbImage, RgbaImage};

use crate::{
    effects::composite::{BlendKernel, blend_at},
    foundation::core::{Affine, Point, midpoint},
    foundation::error::{MannequinError, MannequinResult},
    foundation::math::{perpendicular, solve_affine_3pt},
    pose::sequence::PoseFrame,
    render::config::{RenderConfig, SegmentRest},
    render::placement::{FramePlacement, solve_placement},
    render::warp::warp_nearest,
    rig::joint::Joint,
    rig::part::{Part, SegmentGroup},
};

/// Joint marker color (yellow).
pub const DEBUG_MARKER_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
/// Joint marker radius in pixels.
pub const DEBUG_MARKER_RADIUS: i64 = 3;

const TORSO_JOINTS: [Joint; 4] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftHip,
    Joint::RightHip,
];

/// Sprite lookup used by the compositor.
pub trait SpriteSource {
    /// Sprite for `part`, at the rig's reference size.
    fn sprite(&self, part: Part) -> MannequinResult<&RgbaImage>;
}

impl SpriteSource for crate::assets::store::SpriteBundle {
    fn sprite(&self, part: Part) -> MannequinResult<&RgbaImage> {
        self.get(part)
    }
}

/// Draw order of the three segment groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawStep {
    Legs,
    Body,
    Arms,
}

/// Group order for a run: arms always last, torso/legs order per rig.
pub fn draw_order(alt_z_order: bool) -> [DrawStep; 3] {
    if alt_z_order {
        [DrawStep::Body, DrawStep::Legs, DrawStep::Arms]
    } else {
        [DrawStep::Legs, DrawStep::Body, DrawStep::Arms]
    }
}

/// Render one reference-space pose onto a copy of `background`.
///
/// Segments whose joints are not both finite, or whose correspondence is degenerate, are skipped.
pub fn compose_frame(
    cfg: &RenderConfig,
    sprites: &dyn SpriteSource,
    background: &RgbImage,
    pose: &PoseFrame,
) -> MannequinResult<RgbImage> {
    if background.dimensions() != (cfg.canvas.width, cfg.canvas.height) {
        return Err(MannequinError::validation(format!(
            "background is {}x{}, canvas is {}x{}",
            background.width(),
            background.height(),
            cfg.canvas.width,
            cfg.canvas.height
        )));
    }

    let placement = solve_placement(pose, &cfg.placement);
    let kps = pose.translated(placement.offset());
    let kernel = cfg.kernel.kernel();
    let mut canvas = background.clone();

    for step in draw_order(cfg.alt_z_order) {
        match step {
            DrawStep::Legs | DrawStep::Arms => {
                let group = if step == DrawStep::Legs {
                    SegmentGroup::Legs
                } else {
                    SegmentGroup::Arms
                };
                draw_group(cfg, sprites, kernel, &mut canvas, &kps, placement.scale_x, group)?;
            }
            DrawStep::Body => draw_torso(cfg, sprites, kernel, &mut canvas, &kps, &placement)?,
        }
    }

    if cfg.show_debug {
        for p in kps.finite_points() {
            draw_marker(&mut canvas, p);
        }
    }
    Ok(canvas)
}

fn draw_group(
    cfg: &RenderConfig,
    sprites: &dyn SpriteSource,
    kernel: &dyn BlendKernel,
    canvas: &mut RgbImage,
    kps: &PoseFrame,
    scale_x: f64,
    group: SegmentGroup,
) -> MannequinResult<()> {
    for rest in cfg.group(group) {
        let Some(xf) = segment_transform(rest, kps, scale_x) else {
            tracing::trace!(part = %rest.segment.part, "segment skipped");
            continue;
        };
        paste(cfg, sprites.sprite(rest.segment.part)?, xf, kernel, canvas);
    }
    Ok(())
}

/// Affine map taking a segment's rest geometry onto the observed joints, if it can be drawn.
///
/// `scale_x` is the thickness factor from [`solve_placement`], already inside its range.
pub fn segment_transform(rest: &SegmentRest, kps: &PoseFrame, scale_x: f64) -> Option<Affine> {
    let (from, to) = (rest.segment.from, rest.segment.to);
    if !kps.has(from) || !kps.has(to) {
        return None;
    }
    let (q0, q1) = (kps.joint(from), kps.joint(to));
    let v = q1 - q0;
    let len = v.hypot();
    if len < 1e-6 {
        return None;
    }
    let thickness = rest.base_width * scale_x;
    let mid = midpoint(q0, q1) + perpendicular(v / len) * thickness;
    solve_affine_3pt([rest.p0, rest.p1, rest.mid], [q0, q1, mid])
}

fn draw_torso(
    cfg: &RenderConfig,
    sprites: &dyn SpriteSource,
    kernel: &dyn BlendKernel,
    canvas: &mut RgbImage,
    kps: &PoseFrame,
    placement: &FramePlacement,
) -> MannequinResult<()> {
    let sprite = sprites.sprite(Part::Body)?;
    let xf = if kps.has_all(&TORSO_JOINTS) {
        let hip_center = midpoint(kps.joint(Joint::LeftHip), kps.joint(Joint::RightHip));
        let t = &cfg.torso;
        let solved = solve_affine_3pt(
            [t.left_shoulder, t.right_shoulder, t.hip_center],
            [
                kps.joint(Joint::LeftShoulder),
                kps.joint(Joint::RightShoulder),
                hip_center,
            ],
        );
        let Some(xf) = solved else {
            tracing::trace!("torso correspondence is degenerate");
            return Ok(());
        };
        xf
    } else {
        Affine::translate(placement.offset())
    };
    paste(cfg, sprite, xf, kernel, canvas);
    Ok(())
}

fn paste(
    cfg: &RenderConfig,
    sprite: &RgbaImage,
    xf: Affine,
    kernel: &dyn BlendKernel,
    canvas: &mut RgbImage,
) {
    if let Some(warped) = warp_nearest(sprite, xf, cfg.canvas) {
        blend_at(kernel, canvas, &warped.image, warped.origin);
    }
}

/// Filled disc centred on the truncated integer position of `p`.
fn draw_marker(canvas: &mut RgbImage, p: Point) {
    let (cx, cy) = (p.x as i64, p.y as i64);
    let (w, h) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let r = DEBUG_MARKER_RADIUS;
    for y in cy.saturating_sub(r).max(0)..=cy.saturating_add(r).min(h - 1) {
        for x in cx.saturating_sub(r).max(0)..=cx.saturating_add(r).min(w - 1) {
            let (ddx, ddy) = (x - cx, y - cy);
            if ddx * ddx + ddy * ddy <= r * r {
                canvas.put_pixel(x as u32, y as u32, DEBUG_MARKER_COLOR);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
