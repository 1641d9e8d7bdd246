use super::*;

fn gradient(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 7]))
}

#[test]
fn cover_always_yields_requested_size() {
    let sources = [(10, 10), (3, 17), (640, 360), (1, 1), (999, 2)];
    let targets = [(1080, 1100), (64, 32), (7, 5), (1, 1)];
    for (sw, sh) in sources {
        for (tw, th) in targets {
            let out = resize_cover(&gradient(sw, sh), tw, th).unwrap();
            assert_eq!(out.dimensions(), (tw, th), "src {sw}x{sh} -> {tw}x{th}");
        }
    }
}

#[test]
fn cover_center_crops_wide_sources() {
    // 4x1 scaled x2 -> 8x2, cropped to the middle 2x2; the outer source columns are cut off.
    let src = RgbImage::from_fn(4, 1, |x, _| Rgb([x as u8 * 10, 0, 0]));
    let out = resize_cover(&src, 2, 2).unwrap();
    for px in out.pixels() {
        assert!(px.0[0] == 10 || px.0[0] == 20, "{px:?}");
    }
}

#[test]
fn fit_pads_with_spec_color() {
    let src = RgbImage::from_pixel(2, 1, Rgb([200, 200, 200]));
    let out = resize_fit(&src, 4, 4, Rgb8::new(1, 2, 3)).unwrap();
    assert_eq!(out.dimensions(), (4, 4));
    assert_eq!(out.get_pixel(0, 0).0, [1, 2, 3]);
    assert_eq!(out.get_pixel(1, 1).0, [200, 200, 200]);
    assert_eq!(out.get_pixel(3, 3).0, [1, 2, 3]);
}

#[test]
fn build_without_path_is_solid_fill() {
    let spec = BackgroundSpec {
        color: Rgb8::new(9, 8, 7),
        ..BackgroundSpec::default()
    };
    let bg = build_background(&spec, None, Canvas { width: 3, height: 2 }).unwrap();
    assert_eq!(bg.dimensions(), (3, 2));
    assert!(bg.pixels().all(|p| p.0 == [9, 8, 7]));
}

#[test]
fn build_native_keeps_source_dimensions() {
    let spec = BackgroundSpec {
        resize: ResizeMode::Native,
        ..BackgroundSpec::default()
    };
    let src = gradient(5, 3);
    let bg = build_background(&spec, Some(&src), Canvas { width: 5, height: 3 }).unwrap();
    assert_eq!(bg, src);
}

#[test]
fn background_path_resolves_relative_to_assets_dir() {
    let spec = BackgroundSpec {
        path: Some("bg/room.png".to_string()),
        ..BackgroundSpec::default()
    };
    assert_eq!(
        background_path(&spec, Path::new("/rigs/ren_parts")),
        Some(PathBuf::from("/rigs/ren_parts/bg/room.png"))
    );
    assert_eq!(background_path(&BackgroundSpec::default(), Path::new("/x")), None);
}

#[test]
fn missing_background_file_is_asset_not_found() {
    let spec = BackgroundSpec {
        path: Some("nope.png".to_string()),
        ..BackgroundSpec::default()
    };
    let err = load_background_source(&spec, &std::env::temp_dir()).unwrap_err();
    assert!(matches!(err, MannequinError::AssetNotFound(_)));
}
