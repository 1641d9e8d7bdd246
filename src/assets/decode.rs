use std::path::Path;

use anyhow::Context;
use image::{DynamicImage, RgbImage, RgbaImage, imageops::FilterType};

use crate::{
    foundation::core::Canvas,
    foundation::error::{MannequinError, MannequinResult},
};

/// Read an image file, mapping a missing file to [`MannequinError::AssetNotFound`].
pub fn read_image(path: &Path) -> MannequinResult<DynamicImage> {
    if !path.is_file() {
        return Err(MannequinError::asset_not_found(path));
    }
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let img = image::load_from_memory(&bytes)
        .with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(img)
}

/// Load a sprite as RGBA8 sized exactly to `size`.
///
/// Gray and RGB inputs gain an opaque alpha channel. Sprites of any other size are resampled
/// with nearest-neighbour so hard sprite edges survive.
pub fn load_sprite(path: &Path, size: Canvas) -> MannequinResult<RgbaImage> {
    let rgba = read_image(path)?.to_rgba8();
    Ok(resize_rgba_nearest(rgba, size))
}

/// Nearest-neighbour resize; returns the input untouched when it already has the target size.
pub fn resize_rgba_nearest(img: RgbaImage, size: Canvas) -> RgbaImage {
    if img.dimensions() == (size.width, size.height) {
        return img;
    }
    image::imageops::resize(&img, size.width, size.height, FilterType::Nearest)
}

/// Convert any decoded image to opaque RGB8, flattening alpha over black.
pub fn flatten_to_rgb(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);
    for (d, s) in out.pixels_mut().zip(rgba.pixels()) {
        let a = f32::from(s[3]) / 255.0;
        for c in 0..3 {
            d[c] = (f32::from(s[c]) * a) as u8;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
