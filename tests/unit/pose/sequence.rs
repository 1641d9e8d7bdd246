use super::*;

const REF: Canvas = Canvas {
    width: 600,
    height: 1000,
};

fn doc(kps: &str) -> String {
    format!(r#"{{"video_size": [1200, 500], "fps": 30, "stride": 3, "frames": [{{"kps": {kps}}}]}}"#)
}

#[test]
fn coordinates_rescale_independently_per_axis() {
    let seq = parse_pose_sequence(&doc("[[100, 50], [1200, 500]]"), REF).unwrap();
    assert_eq!(seq.len(), 1);
    let f = &seq.frames[0];
    assert_eq!(f.points()[0], Point::new(50.0, 100.0));
    assert_eq!(f.points()[1], Point::new(600.0, 1000.0));
    // Unspecified trailing joints are missing.
    assert!(!f.has(Joint::RightAnkle));
}

#[test]
fn effective_fps_divides_by_stride() {
    let seq = parse_pose_sequence(&doc("[]"), REF).unwrap();
    assert_eq!(seq.source_fps, 30.0);
    assert_eq!(seq.stride, 3);
    assert_eq!(seq.effective_fps(), 10.0);
}

#[test]
fn fps_and_stride_have_defaults() {
    let text = r#"{"video_size": [600, 1000], "frames": []}"#;
    let seq = parse_pose_sequence(text, REF).unwrap();
    assert_eq!(seq.source_fps, 30.0);
    assert_eq!(seq.stride, 1);
    assert!(seq.is_empty());
}

#[test]
fn missing_joints_in_every_form_become_nan() {
    let seq = parse_pose_sequence(&doc("[null, [null, null], [NaN, NaN], [1, -Infinity], [12, 10]]"), REF)
        .unwrap();
    let pts = seq.frames[0].points();
    for p in &pts[..4] {
        assert!(p.x.is_nan() && p.y.is_nan(), "{p:?}");
    }
    assert_eq!(pts[4], Point::new(6.0, 20.0));
}

#[test]
fn sanitizer_leaves_strings_alone() {
    let text = r#"{"note": "NaN \"Infinity\"", "v": NaN}"#;
    let clean = sanitize_non_finite_literals(text);
    assert_eq!(clean, r#"{"note": "NaN \"Infinity\"", "v": null}"#);
    assert!(matches!(
        sanitize_non_finite_literals("[1, 2]"),
        std::borrow::Cow::Borrowed(_)
    ));
}

#[test]
fn malformed_documents_are_pose_data_invalid() {
    for bad in [
        "not json",
        r#"{"fps": 30, "frames": []}"#,
        r#"{"video_size": [0, 100], "frames": []}"#,
        r#"{"video_size": [10, 10], "fps": 0, "frames": []}"#,
        r#"{"video_size": [10, 10], "stride": 0, "frames": []}"#,
    ] {
        let err = parse_pose_sequence(bad, REF).unwrap_err();
        assert!(matches!(err, MannequinError::PoseDataInvalid(_)), "{bad}: {err}");
    }

    let too_many = format!("[{}]", vec!["[1, 1]"; 18].join(","));
    assert!(matches!(
        parse_pose_sequence(&doc(&too_many), REF),
        Err(MannequinError::PoseDataInvalid(_))
    ));
}

#[test]
fn unreadable_file_is_pose_data_invalid() {
    let path = std::env::temp_dir().join("mannequin_missing_pose.json");
    assert!(matches!(
        load_pose_sequence(&path, REF),
        Err(MannequinError::PoseDataInvalid(_))
    ));
}

#[test]
fn swap_lr_exchanges_limb_pairs_only() {
    let mut opts = [None; JOINT_COUNT];
    opts[Joint::Nose.index()] = Some([1.0, 1.0]);
    opts[Joint::LeftWrist.index()] = Some([2.0, 2.0]);
    opts[Joint::RightWrist.index()] = Some([3.0, 3.0]);
    let f = PoseFrame::from_options(opts).swap_lr();
    assert_eq!(f.joint(Joint::Nose), Point::new(1.0, 1.0));
    assert_eq!(f.joint(Joint::LeftWrist), Point::new(3.0, 3.0));
    assert_eq!(f.joint(Joint::RightWrist), Point::new(2.0, 2.0));
}

#[test]
fn hflip_mirrors_inside_reference_width() {
    let mut opts = [None; JOINT_COUNT];
    opts[0] = Some([0.0, 7.0]);
    opts[1] = Some([599.0, 8.0]);
    let f = PoseFrame::from_options(opts).hflip(600);
    assert_eq!(f.points()[0], Point::new(599.0, 7.0));
    assert_eq!(f.points()[1], Point::new(0.0, 8.0));
    assert!(!f.has(Joint::LeftEye));
}

#[test]
fn translated_keeps_missing_joints_missing() {
    let mut opts = [None; JOINT_COUNT];
    opts[0] = Some([1.0, 2.0]);
    let f = PoseFrame::from_options(opts).translated(Vec2::new(10.0, -1.0));
    assert_eq!(f.points()[0], Point::new(11.0, 1.0));
    assert_eq!(f.finite_points().count(), 1);
}
