use crate::{
    foundation::core::Vec2,
    foundation::math::clamp_or_min,
    pose::sequence::PoseFrame,
    render::config::PlacementParams,
    rig::descriptor::VAlignMode,
    rig::joint::{FOOT_REGION, Joint},
};

/// Lower and upper bounds of the limb thickness factor.
pub const SCALE_X_RANGE: (f64, f64) = (0.1, 1.0);

/// Per-frame translation and limb thickness factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePlacement {
    /// Horizontal translation from reference space to canvas space.
    pub dx: f64,
    /// Vertical translation from reference space to canvas space.
    pub dy: f64,
    /// Observed / rest shoulder width, within [`SCALE_X_RANGE`].
    pub scale_x: f64,
}

impl FramePlacement {
    /// Translation as a vector.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }
}

/// Compute the translation and thickness factor for one reference-space frame.
pub fn solve_placement(frame: &PoseFrame, params: &PlacementParams) -> FramePlacement {
    FramePlacement {
        dx: solve_dx(frame, params),
        dy: solve_dy(frame, params),
        scale_x: solve_scale_x(frame, params.rest_shoulder_width),
    }
}

/// x of the midpoint of both hips, when both are finite.
pub fn hip_center_x(frame: &PoseFrame) -> Option<f64> {
    frame
        .has_all(&[Joint::LeftHip, Joint::RightHip])
        .then(|| 0.5 * (frame.joint(Joint::LeftHip).x + frame.joint(Joint::RightHip).x))
}

fn solve_dx(frame: &PoseFrame, params: &PlacementParams) -> f64 {
    if params.follow_center
        && let Some(hx) = hip_center_x(frame)
    {
        return f64::from(params.canvas.width) * 0.5 - hx;
    }
    params.offset_x
}

fn solve_dy(frame: &PoseFrame, params: &PlacementParams) -> f64 {
    let ys = frame
        .points()
        .iter()
        .map(|p| p.y)
        .filter(|y| y.is_finite());
    let Some((ymin, ymax)) = ys.fold(None, |acc: Option<(f64, f64)>, y| {
        Some(acc.map_or((y, y), |(lo, hi)| (lo.min(y), hi.max(y))))
    }) else {
        return params.top_pad;
    };

    let canvas_h = f64::from(params.canvas.height);
    match params.v_align {
        VAlignMode::TopPad => params.top_pad,
        VAlignMode::Center => {
            let char_h = (ymax - ymin).max(1.0);
            (canvas_h - char_h) * 0.5 - ymin
        }
        VAlignMode::Feet => {
            let anchor_y = FOOT_REGION
                .iter()
                .map(|j| frame.joint(*j).y)
                .filter(|y| y.is_finite())
                .reduce(f64::max)
                .unwrap_or(ymax);
            canvas_h - params.bottom_margin - anchor_y
        }
    }
}

fn solve_scale_x(frame: &PoseFrame, rest_shoulder_width: f64) -> f64 {
    let (lo, hi) = SCALE_X_RANGE;
    if !frame.has_all(&[Joint::LeftShoulder, Joint::RightShoulder]) {
        return hi;
    }
    let observed = (frame.joint(Joint::LeftShoulder) - frame.joint(Joint::RightShoulder)).hypot();
    clamp_or_min(observed / rest_shoulder_width, lo, hi)
}

#[cfg(test)]
#[path = "../../tests/unit/render/placement.rs"]
mod tests;
