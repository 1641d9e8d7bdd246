use image::RgbImage;

use crate::foundation::error::{MannequinError, MannequinResult};

/// Gaussian blur of an RGB8 image with a square odd kernel of `ksize` taps.
///
/// `sigma` follows the usual "derive from kernel size" rule when the caller has no preference:
/// `0.3 * ((ksize - 1) / 2 - 1) + 0.8`. Edges are clamped.
pub fn gaussian_blur_rgb8(src: &RgbImage, ksize: u32) -> MannequinResult<RgbImage> {
    if ksize <= 1 {
        return Ok(src.clone());
    }
    if ksize.is_multiple_of(2) {
        return Err(MannequinError::validation("blur kernel size must be odd"));
    }
    let sigma = 0.3 * ((f64::from(ksize) - 1.0) * 0.5 - 1.0) + 0.8;
    let kernel = gaussian_kernel_q16(ksize / 2, sigma)?;

    let (width, height) = src.dimensions();
    let mut tmp = vec![0u8; src.as_raw().len()];
    let mut out = vec![0u8; src.as_raw().len()];
    horizontal_pass(src.as_raw(), &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);

    RgbImage::from_raw(width, height, out)
        .ok_or_else(|| MannequinError::validation("blur output buffer size mismatch"))
}

/// Odd kernel size used for a descriptor `blur` value (`round`, then bumped to odd).
pub fn kernel_size_for(blur: f64) -> u32 {
    if !blur.is_finite() || blur <= 0.0 {
        return 0;
    }
    let k = blur.round().max(1.0) as u32;
    if k.is_multiple_of(2) { k + 1 } else { k }
}

fn gaussian_kernel_q16(radius: u32, sigma: f64) -> MannequinResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(MannequinError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Fold rounding drift into the center tap so the kernel sums to exactly 1.0 (Q16).
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

const CHANNELS: usize = 3;

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; CHANNELS];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * CHANNELS;
                for c in 0..CHANNELS {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * CHANNELS;
            for c in 0..CHANNELS {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; CHANNELS];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * CHANNELS;
                for c in 0..CHANNELS {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * CHANNELS;
            for c in 0..CHANNELS {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
