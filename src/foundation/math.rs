use crate::foundation::core::{Affine, Point, Vec2};

/// Solve the unique affine map taking `src[i]` to `dst[i]` for `i in 0..3`.
///
/// Returns `None` when the source triangle is degenerate (collinear or non-finite points), in
/// which case no unique solution exists.
pub fn solve_affine_3pt(src: [Point; 3], dst: [Point; 3]) -> Option<Affine> {
    let u1 = src[1] - src[0];
    let u2 = src[2] - src[0];
    let v1 = dst[1] - dst[0];
    let v2 = dst[2] - dst[0];

    let det = u1.x * u2.y - u2.x * u1.y;
    let scale = u1.hypot() * u2.hypot();
    if !det.is_finite() || det.abs() <= 1e-9 * scale.max(1e-12) {
        return None;
    }

    let l00 = (v1.x * u2.y - v2.x * u1.y) / det;
    let l01 = (v2.x * u1.x - v1.x * u2.x) / det;
    let l10 = (v1.y * u2.y - v2.y * u1.y) / det;
    let l11 = (v2.y * u1.x - v1.y * u2.x) / det;

    let tx = dst[0].x - (l00 * src[0].x + l01 * src[0].y);
    let ty = dst[0].y - (l10 * src[0].x + l11 * src[0].y);

    let out = Affine::new([l00, l10, l01, l11, tx, ty]);
    out.is_finite().then_some(out)
}

/// Unit vector perpendicular to `v`, rotated +90 degrees in image space (`(-y, x)`).
#[inline]
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Clamp helper that treats NaN as the lower bound.
#[inline]
pub fn clamp_or_min(v: f64, min: f64, max: f64) -> f64 {
    if v.is_nan() { min } else { v.clamp(min, max) }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
