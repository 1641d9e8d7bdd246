use super::*;

#[path = "../../support/mod.rs"]
mod support;

fn fixture_rig() -> Rig {
    let json = support::rig_descriptor(
        serde_json::json!({"v_align_mode": "feet"}),
        serde_json::json!({"color": [0, 0, 0]}),
    );
    Rig::from_def(serde_json::from_value(json).unwrap()).unwrap()
}

#[test]
fn canvas_size_adds_side_and_top_padding() {
    let c = canvas_size(
        Canvas {
            width: 600,
            height: 1000,
        },
        240,
        100,
    )
    .unwrap();
    assert_eq!((c.width, c.height), (1080, 1100));
}

#[test]
fn negative_top_pad_does_not_shrink_canvas() {
    let c = canvas_size(
        Canvas {
            width: 10,
            height: 20,
        },
        0,
        -50,
    )
    .unwrap();
    assert_eq!((c.width, c.height), (10, 20));
}

#[test]
fn oversized_padding_is_rejected() {
    let reference = Canvas {
        width: 600,
        height: 1000,
    };
    let err = canvas_size(reference, u32::MAX / 2, 100).unwrap_err();
    assert!(matches!(err, MannequinError::Validation(_)));
    assert!(canvas_size(reference, 0, i32::MAX).is_ok());
    assert!(canvas_size(Canvas { width: 600, height: u32::MAX }, 0, 1).is_err());
}

#[test]
fn default_opts_match_documented_values() {
    let o = RenderOpts::default();
    assert_eq!(o.side_pad, 240);
    assert_eq!(o.top_pad, 100);
    assert_eq!(o.offset_x, 0);
    assert_eq!(o.stride, 1);
    assert!(o.show_debug && o.follow_center && o.swap_lr && !o.hflip);
    assert!(o.threads.is_none() && o.kernel.is_none());
    o.validate().unwrap();
}

#[test]
fn invalid_opts_are_rejected() {
    let zero_stride = RenderOpts {
        stride: 0,
        ..RenderOpts::default()
    };
    assert!(zero_stride.validate().is_err());
    let zero_threads = RenderOpts {
        threads: Some(0),
        ..RenderOpts::default()
    };
    assert!(zero_threads.validate().is_err());
}

#[test]
fn alternate_z_order_follows_directory_name() {
    assert!(uses_alternate_z_order(Path::new("/a/b/Ren_Parts")));
    assert!(uses_alternate_z_order(Path::new("assets/my_rens_parts_v2")));
    assert!(!uses_alternate_z_order(Path::new("assets/parts")));
    assert!(!uses_alternate_z_order(Path::new("ren_parts/inner")));
}

#[test]
fn config_resolves_rig_geometry() {
    let rig = fixture_rig();
    let canvas = canvas_size(rig.ref_size, 20, 10).unwrap();
    let opts = RenderOpts {
        side_pad: 20,
        top_pad: 10,
        kernel: Some(KernelKind::Uniform),
        ..RenderOpts::default()
    };
    let cfg = RenderConfig::new(&rig, Path::new("plain"), &opts, canvas).unwrap();

    assert_eq!(cfg.canvas, canvas);
    assert_eq!(cfg.kernel, KernelKind::Uniform);
    assert!(!cfg.alt_z_order);
    // Side padding widens the canvas only; the fixed offset is its own option.
    assert_eq!(cfg.placement.offset_x, 0.0);
    assert_eq!(cfg.placement.top_pad, 10.0);
    assert_eq!(cfg.placement.v_align, VAlignMode::Feet);
    assert!((cfg.placement.rest_shoulder_width - 20.0).abs() < 1e-3);
    assert_eq!(cfg.torso.hip_center, Point::new(30.0, 55.0));

    assert_eq!(cfg.segments.len(), 8);
    assert_eq!(cfg.group(SegmentGroup::Legs).count(), 4);
    let arms: Vec<Part> = cfg.group(SegmentGroup::Arms).map(|s| s.segment.part).collect();
    assert_eq!(
        arms,
        [
            Part::LeftUpperArm,
            Part::RightUpperArm,
            Part::LeftLowerArm,
            Part::RightLowerArm
        ]
    );

    // Left upper leg: (24,55) -> (24,75), base width 2, perpendicular points to -x.
    let lul = &cfg.segments[0];
    assert_eq!(lul.segment.part, Part::LeftUpperLeg);
    assert!((lul.base_width - 2.0).abs() < 1e-9);
    assert!((lul.mid.x - 22.0).abs() < 1e-6);
    assert!((lul.mid.y - 65.0).abs() < 1e-6);
}

#[test]
fn zero_length_segment_gets_unit_base_width() {
    let mut json = support::rig_descriptor(
        serde_json::json!({}),
        serde_json::json!({"color": [0, 0, 0]}),
    );
    json["tip_lower"]["left_lower_arm"] = serde_json::json!([12.0, 45.0]);
    let rig = Rig::from_def(serde_json::from_value(json).unwrap()).unwrap();
    let cfg = RenderConfig::new(
        &rig,
        Path::new("x"),
        &RenderOpts::default(),
        canvas_size(rig.ref_size, 0, 0).unwrap(),
    )
    .unwrap();
    let lla = cfg
        .segments
        .iter()
        .find(|s| s.segment.part == Part::LeftLowerArm)
        .unwrap();
    assert_eq!(lla.base_width, 1.0);
}
