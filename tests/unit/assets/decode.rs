use std::io::Cursor;

use super::*;

fn png_bytes(img: DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn rgb_sprite_gains_opaque_alpha() {
    let img = RgbImage::from_raw(1, 1, vec![100u8, 50, 200]).unwrap();
    let path = std::env::temp_dir().join(format!("mannequin_rgb_sprite_{}.png", std::process::id()));
    std::fs::write(&path, png_bytes(DynamicImage::ImageRgb8(img))).unwrap();
    let rgba = load_sprite(&path, Canvas { width: 1, height: 1 }).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(rgba.as_raw().as_slice(), &[100, 50, 200, 255]);
}

#[test]
fn resize_nearest_keeps_hard_edges() {
    // 2x1: opaque red | transparent
    let img = RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 0, 0]).unwrap();
    let out = resize_rgba_nearest(img, Canvas { width: 4, height: 2 });
    assert_eq!(out.dimensions(), (4, 2));
    for px in out.pixels() {
        assert!(px.0 == [255, 0, 0, 255] || px.0 == [0, 0, 0, 0], "{px:?}");
    }
    assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(out.get_pixel(3, 1).0, [0, 0, 0, 0]);
}

#[test]
fn resize_is_identity_at_target_size() {
    let img = RgbaImage::from_raw(1, 1, vec![1, 2, 3, 4]).unwrap();
    let out = resize_rgba_nearest(img.clone(), Canvas { width: 1, height: 1 });
    assert_eq!(out, img);
}

#[test]
fn missing_sprite_is_asset_not_found() {
    let path = std::env::temp_dir().join("mannequin_definitely_missing_sprite.png");
    let err = load_sprite(&path, Canvas { width: 1, height: 1 }).unwrap_err();
    assert!(matches!(err, MannequinError::AssetNotFound(p) if p == path));
}

#[test]
fn flatten_composites_alpha_over_black() {
    let img = RgbaImage::from_raw(2, 1, vec![200, 100, 50, 255, 200, 100, 50, 0]).unwrap();
    let rgb = flatten_to_rgb(&DynamicImage::ImageRgba8(img));
    assert_eq!(rgb.as_raw().as_slice(), &[200, 100, 50, 0, 0, 0]);
}
