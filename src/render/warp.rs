use image::{Rgba, RgbaImage};

use crate::foundation::core::{Affine, Canvas, Point};

/// A sprite warped into canvas space, cropped to the canvas pixels it can touch.
#[derive(Clone, Debug)]
pub struct WarpedSprite {
    /// Warped pixels; everything outside the sprite is fully transparent.
    pub image: RgbaImage,
    /// Canvas position of `image`'s top-left pixel.
    pub origin: (i64, i64),
}

/// Warp `src` through `xf` (source -> canvas) with nearest-neighbour sampling.
///
/// Each destination pixel `(x, y)` samples `xf⁻¹(x, y)` rounded to the nearest source pixel;
/// samples outside `src` are transparent. Only the bounding box of the transformed sprite
/// (clipped to `canvas`) is produced. Returns `None` when that box is empty or `xf` is singular.
pub fn warp_nearest(src: &RgbaImage, xf: Affine, canvas: Canvas) -> Option<WarpedSprite> {
    if !xf.is_finite() || xf.determinant().abs() < 1e-12 {
        return None;
    }
    let inv = xf.inverse();
    if !inv.is_finite() {
        return None;
    }

    let (sw, sh) = (f64::from(src.width()), f64::from(src.height()));
    let corners = [
        Point::new(-1.0, -1.0),
        Point::new(sw + 1.0, -1.0),
        Point::new(-1.0, sh + 1.0),
        Point::new(sw + 1.0, sh + 1.0),
    ]
    .map(|p| xf * p);

    let (mut x0, mut y0, mut x1, mut y1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for c in corners {
        x0 = x0.min(c.x);
        y0 = y0.min(c.y);
        x1 = x1.max(c.x);
        y1 = y1.max(c.y);
    }
    let x0 = x0.floor().max(0.0) as i64;
    let y0 = y0.floor().max(0.0) as i64;
    let x1 = x1.ceil().min(f64::from(canvas.width)) as i64;
    let y1 = y1.ceil().min(f64::from(canvas.height)) as i64;
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    let (w, h) = ((x1 - x0) as u32, (y1 - y0) as u32);
    let (src_w, src_h) = (i64::from(src.width()), i64::from(src.height()));
    let image = RgbaImage::from_fn(w, h, |x, y| {
        let p = inv * Point::new((x0 + i64::from(x)) as f64, (y0 + i64::from(y)) as f64);
        let sx = (p.x + 0.5).floor() as i64;
        let sy = (p.y + 0.5).floor() as i64;
        if (0..src_w).contains(&sx) && (0..src_h).contains(&sy) {
            *src.get_pixel(sx as u32, sy as u32)
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    Some(WarpedSprite {
        image,
        origin: (x0, y0),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/warp.rs"]
mod tests;
