use super::*;

use image::{Rgb, Rgba};

const KINDS: [KernelKind; 2] = [KernelKind::PerPixel, KernelKind::Uniform];

fn one_px(kind: KernelKind, dst: [u8; 3], src: [u8; 4]) -> [u8; 3] {
    let mut d = dst;
    kind.kernel().blend_row(&mut d, &src);
    d
}

#[test]
fn alpha_zero_leaves_destination_unchanged() {
    for kind in KINDS {
        assert_eq!(one_px(kind, [13, 200, 77], [255, 0, 255, 0]), [13, 200, 77]);
    }
}

#[test]
fn alpha_full_copies_source_exactly() {
    for kind in KINDS {
        assert_eq!(one_px(kind, [13, 200, 77], [1, 254, 128, 255]), [1, 254, 128]);
    }
}

#[test]
fn half_alpha_is_within_one_of_real_blend() {
    for kind in KINDS {
        for (d, s) in [(0u8, 255u8), (255, 0), (100, 201), (37, 38), (250, 3)] {
            let out = one_px(kind, [d; 3], [s, s, s, 128]);
            let a = 128.0 / 255.0;
            let exact = f64::from(d) * (1.0 - a) + f64::from(s) * a;
            assert!((f64::from(out[0]) - exact).abs() <= 1.0, "{kind:?} d={d} s={s} -> {}", out[0]);
        }
    }
}

#[test]
fn kernels_agree_between_thresholds() {
    // A long row exercises both the lane blocks and the tail of the uniform kernel.
    let n = 250usize;
    let src: Vec<u8> = (0..n)
        .flat_map(|i| {
            let a = 3 + (i % 250) as u8;
            [(i * 7 % 256) as u8, (i * 13 % 256) as u8, (i * 29 % 256) as u8, a]
        })
        .collect();
    let base: Vec<u8> = (0..n * 3).map(|i| (i * 31 % 256) as u8).collect();

    let mut a = base.clone();
    let mut b = base;
    PerPixelKernel.blend_row(&mut a, &src);
    UniformKernel.blend_row(&mut b, &src);
    assert_eq!(a, b);
}

#[test]
fn blend_at_origin_covers_equal_sized_layer() {
    for kind in KINDS {
        let mut dst = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
        let mut src = RgbaImage::from_pixel(3, 2, Rgba([200, 100, 0, 255]));
        src.put_pixel(2, 1, Rgba([0, 0, 0, 0]));
        blend_at(kind.kernel(), &mut dst, &src, (0, 0));
        assert_eq!(dst.get_pixel(0, 0).0, [200, 100, 0], "{kind:?}");
        assert_eq!(dst.get_pixel(1, 1).0, [200, 100, 0], "{kind:?}");
        assert_eq!(dst.get_pixel(2, 1).0, [10, 20, 30], "{kind:?}");
    }
}

#[test]
fn blend_at_clips_to_destination() {
    for kind in KINDS {
        let mut dst = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let src = RgbaImage::from_pixel(3, 3, Rgba([9, 9, 9, 255]));
        blend_at(kind.kernel(), &mut dst, &src, (-1, 2));
        for (x, y, px) in dst.enumerate_pixels() {
            let inside = x < 2 && y >= 2;
            assert_eq!(px.0, if inside { [9; 3] } else { [0; 3] }, "{kind:?} ({x},{y})");
        }

        // Entirely outside: no-op.
        blend_at(kind.kernel(), &mut dst, &src, (10, 10));
        blend_at(kind.kernel(), &mut dst, &src, (-3, 0));
    }
}

#[test]
fn selected_kernel_follows_build_feature() {
    let expected = if cfg!(feature = "fast-blend") {
        KernelKind::PerPixel
    } else {
        KernelKind::Uniform
    };
    assert_eq!(select_kernel(), expected);
    assert_eq!(KernelKind::Uniform.kernel().name(), "uniform");
}
