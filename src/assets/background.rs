use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage, imageops::FilterType};

use crate::{
    assets::decode::{flatten_to_rgb, read_image},
    effects::blur::{gaussian_blur_rgb8, kernel_size_for},
    foundation::core::{Canvas, Rgb8},
    foundation::error::{MannequinError, MannequinResult},
    rig::descriptor::{BackgroundSpec, ResizeMode},
};

/// Resolve the background image path of `spec` against the asset directory.
pub fn background_path(spec: &BackgroundSpec, assets_dir: &Path) -> Option<PathBuf> {
    let raw = spec.path.as_deref().filter(|p| !p.is_empty())?;
    let p = Path::new(raw);
    Some(if p.is_absolute() {
        p.to_path_buf()
    } else {
        assets_dir.join(p)
    })
}

/// Load the background source image, if the spec names one.
pub fn load_background_source(
    spec: &BackgroundSpec,
    assets_dir: &Path,
) -> MannequinResult<Option<RgbImage>> {
    let Some(path) = background_path(spec, assets_dir) else {
        return Ok(None);
    };
    let img = read_image(&path)?;
    Ok(Some(flatten_to_rgb(&img)))
}

/// Build the per-run background canvas.
///
/// Without a source image the canvas is a solid `spec.color` fill. `native` keeps the source as-is
/// (the canvas size is expected to already match it).
pub fn build_background(
    spec: &BackgroundSpec,
    source: Option<&RgbImage>,
    canvas: Canvas,
) -> MannequinResult<RgbImage> {
    let bg = match source {
        Some(img) => match spec.resize {
            ResizeMode::Native => img.clone(),
            ResizeMode::Fit => resize_fit(img, canvas.width, canvas.height, spec.color)?,
            ResizeMode::Cover => resize_cover(img, canvas.width, canvas.height)?,
        },
        None => solid(canvas, spec.color),
    };

    let k = kernel_size_for(spec.blur);
    if k > 1 {
        return gaussian_blur_rgb8(&bg, k);
    }
    Ok(bg)
}

/// Solid-color canvas.
pub fn solid(canvas: Canvas, color: Rgb8) -> RgbImage {
    RgbImage::from_pixel(canvas.width, canvas.height, Rgb(color.to_array()))
}

/// Scale `img` up (or down) until it covers `tw x th`, then center-crop to exactly that size.
pub fn resize_cover(img: &RgbImage, tw: u32, th: u32) -> MannequinResult<RgbImage> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || tw == 0 || th == 0 {
        return Err(MannequinError::validation("resize_cover: invalid image size"));
    }
    let scale = (f64::from(tw) / f64::from(w)).max(f64::from(th) / f64::from(h));
    let nw = ((f64::from(w) * scale).round() as u32).max(tw);
    let nh = ((f64::from(h) * scale).round() as u32).max(th);
    let resized = image::imageops::resize(img, nw, nh, FilterType::Nearest);
    let x0 = (nw - tw) / 2;
    let y0 = (nh - th) / 2;
    Ok(image::imageops::crop_imm(&resized, x0, y0, tw, th).to_image())
}

/// Scale `img` to fit inside `tw x th` and center it on a `pad` filled canvas.
pub fn resize_fit(img: &RgbImage, tw: u32, th: u32, pad: Rgb8) -> MannequinResult<RgbImage> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || tw == 0 || th == 0 {
        return Err(MannequinError::validation("resize_fit: invalid image size"));
    }
    let scale = (f64::from(tw) / f64::from(w)).min(f64::from(th) / f64::from(h));
    let nw = ((f64::from(w) * scale).round() as u32).clamp(1, tw);
    let nh = ((f64::from(h) * scale).round() as u32).clamp(1, th);
    let resized = image::imageops::resize(img, nw, nh, FilterType::Nearest);

    let mut out = RgbImage::from_pixel(tw, th, Rgb(pad.to_array()));
    image::imageops::replace(
        &mut out,
        &resized,
        i64::from((tw - nw) / 2),
        i64::from((th - nh) / 2),
    );
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/background.rs"]
mod tests;
