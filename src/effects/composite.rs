use image::{RgbImage, RgbaImage};

use crate::foundation::error::{MannequinError, MannequinResult};

/// Straight-alpha RGBA-over-RGB blend of one row of pixels.
///
/// `dst` is packed RGB8, `src` packed RGBA8, both covering the same number of pixels. Every
/// implementation must agree with [`blend_channel`] for alphas in `3..=252` and must leave `dst`
/// untouched at alpha 0 and copy `src` exactly at alpha 255.
pub trait BlendKernel: Send + Sync + std::fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Blend `src` over `dst` in place.
    fn blend_row(&self, dst: &mut [u8], src: &[u8]);
}

/// Available blend strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelKind {
    /// [`PerPixelKernel`].
    PerPixel,
    /// [`UniformKernel`].
    Uniform,
}

impl KernelKind {
    /// Kernel instance for this strategy.
    pub fn kernel(self) -> &'static dyn BlendKernel {
        match self {
            KernelKind::PerPixel => &PerPixelKernel,
            KernelKind::Uniform => &UniformKernel,
        }
    }
}

/// Pick the blend strategy for this build: per-pixel with the `fast-blend` feature, uniform lanes
/// otherwise.
pub fn select_kernel() -> KernelKind {
    if cfg!(feature = "fast-blend") {
        KernelKind::PerPixel
    } else {
        KernelKind::Uniform
    }
}

/// `dst * (1 - a) + src * a`, truncated to 8 bits.
#[inline]
pub fn blend_channel(dst: u8, src: u8, a: f32) -> u8 {
    (f32::from(dst) * (1.0 - a) + f32::from(src) * a) as u8
}

/// Tight per-pixel loop that skips near-transparent pixels and copies near-opaque ones.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerPixelKernel;

impl BlendKernel for PerPixelKernel {
    fn name(&self) -> &'static str {
        "per_pixel"
    }

    fn blend_row(&self, dst: &mut [u8], src: &[u8]) {
        for (d, s) in dst.chunks_exact_mut(3).zip(src.chunks_exact(4)) {
            let a = f32::from(s[3]) / 255.0;
            if a <= 0.01 {
                continue;
            }
            if a >= 0.99 {
                d.copy_from_slice(&s[..3]);
                continue;
            }
            for c in 0..3 {
                d[c] = blend_channel(d[c], s[c], a);
            }
        }
    }
}

const LANES: usize = 8;

/// Branch-free formulation over blocks of [`LANES`] pixels; alpha 0 and 255 fall out of the formula.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformKernel;

impl BlendKernel for UniformKernel {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn blend_row(&self, dst: &mut [u8], src: &[u8]) {
        let mut dst_blocks = dst.chunks_exact_mut(LANES * 3);
        let mut src_blocks = src.chunks_exact(LANES * 4);
        for (d, s) in (&mut dst_blocks).zip(&mut src_blocks) {
            let mut a = [0f32; LANES];
            for (i, ai) in a.iter_mut().enumerate() {
                *ai = f32::from(s[i * 4 + 3]) / 255.0;
            }
            for c in 0..3 {
                let mut out = [0f32; LANES];
                for i in 0..LANES {
                    out[i] = f32::from(d[i * 3 + c]) * (1.0 - a[i]) + f32::from(s[i * 4 + c]) * a[i];
                }
                for i in 0..LANES {
                    d[i * 3 + c] = out[i] as u8;
                }
            }
        }

        for (d, s) in dst_blocks
            .into_remainder()
            .chunks_exact_mut(3)
            .zip(src_blocks.remainder().chunks_exact(4))
        {
            let a = f32::from(s[3]) / 255.0;
            for c in 0..3 {
                d[c] = blend_channel(d[c], s[c], a);
            }
        }
    }
}

/// Composite `src` onto `dst` with its top-left corner at `origin`, clipping to `dst`.
pub fn blend_at(kernel: &dyn BlendKernel, dst: &mut RgbImage, src: &RgbaImage, origin: (i64, i64)) {
    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));

    let x0 = origin.0.max(0);
    let y0 = origin.1.max(0);
    let x1 = (origin.0 + sw).min(dw);
    let y1 = (origin.1 + sh).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let span = (x1 - x0) as usize;
    let sx = (x0 - origin.0) as usize;
    let dst_stride = dw as usize * 3;
    let src_stride = sw as usize * 4;
    let dst_buf: &mut [u8] = &mut **dst;
    let src_buf = src.as_raw();
    for y in y0..y1 {
        let sy = (y - origin.1) as usize;
        let d_off = y as usize * dst_stride + x0 as usize * 3;
        let s_off = sy * src_stride + sx * 4;
        kernel.blend_row(
            &mut dst_buf[d_off..d_off + span * 3],
            &src_buf[s_off..s_off + span * 4],
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
