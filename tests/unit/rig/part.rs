use super::*;

#[test]
fn part_names_round_trip_through_from_str() {
    for p in Part::ALL {
        assert_eq!(p.name().parse::<Part>().unwrap(), p);
    }
    assert!("head".parse::<Part>().is_err());
}

#[test]
fn anchor_key_parses_descriptor_form() {
    let k = AnchorKey::parse("body>left_upper_arm").unwrap();
    assert_eq!(k, AnchorKey(Part::Body, Part::LeftUpperArm));
    assert_eq!(k.to_string(), "body>left_upper_arm");

    assert!(AnchorKey::parse("body_left_upper_arm").is_err());
    assert!(AnchorKey::parse("body>tail").is_err());
}

#[test]
fn limb_segments_cover_every_peripheral_part_once() {
    let mut parts: Vec<Part> = LIMB_SEGMENTS.iter().map(|s| s.part).collect();
    parts.sort();
    parts.dedup();
    assert_eq!(parts.len(), 8);
    assert!(!parts.contains(&Part::Body));
}

#[test]
fn limb_segments_only_reference_required_anchors_and_tips() {
    for seg in LIMB_SEGMENTS {
        for end in [seg.start, seg.end] {
            match end {
                AnchorRef::Parent(k) | AnchorRef::Child(k) => {
                    assert!(REQUIRED_ANCHORS.contains(&k), "{k} not required")
                }
                AnchorRef::Tip(p) => assert!(TIP_PARTS.contains(&p)),
            }
        }
    }
}
