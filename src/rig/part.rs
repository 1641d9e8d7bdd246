use std::fmt;
use std::str::FromStr;

use crate::rig::joint::Joint;

/// Closed set of drawable body parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Part {
    /// Torso sprite.
    Body,
    LeftUpperArm,
    LeftLowerArm,
    RightUpperArm,
    RightLowerArm,
    LeftUpperLeg,
    LeftLowerLeg,
    RightUpperLeg,
    RightLowerLeg,
}

impl Part {
    /// Every part, torso first.
    pub const ALL: [Part; 9] = [
        Part::Body,
        Part::LeftUpperArm,
        Part::LeftLowerArm,
        Part::RightUpperArm,
        Part::RightLowerArm,
        Part::LeftUpperLeg,
        Part::LeftLowerLeg,
        Part::RightUpperLeg,
        Part::RightLowerLeg,
    ];

    /// Descriptor name of the part (`left_upper_arm`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Part::Body => "body",
            Part::LeftUpperArm => "left_upper_arm",
            Part::LeftLowerArm => "left_lower_arm",
            Part::RightUpperArm => "right_upper_arm",
            Part::RightLowerArm => "right_lower_arm",
            Part::LeftUpperLeg => "left_upper_leg",
            Part::LeftLowerLeg => "left_lower_leg",
            Part::RightUpperLeg => "right_upper_leg",
            Part::RightLowerLeg => "right_lower_leg",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Part {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Part::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown body part '{s}'"))
    }
}

/// Typed `(parent, child)` key into the anchor table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnchorKey(pub Part, pub Part);

impl AnchorKey {
    /// Parse the descriptor form `"parent>child"`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let (a, b) = raw
            .split_once('>')
            .ok_or_else(|| format!("anchor key '{raw}' is not of the form 'parent>child'"))?;
        Ok(Self(a.trim().parse()?, b.trim().parse()?))
    }
}

impl fmt::Display for AnchorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>{}", self.0, self.1)
    }
}

/// Anchor pairs the compositor looks up; a rig missing any of them is rejected at load time.
pub const REQUIRED_ANCHORS: [AnchorKey; 8] = [
    AnchorKey(Part::Body, Part::LeftUpperArm),
    AnchorKey(Part::Body, Part::RightUpperArm),
    AnchorKey(Part::LeftUpperArm, Part::LeftLowerArm),
    AnchorKey(Part::RightUpperArm, Part::RightLowerArm),
    AnchorKey(Part::LeftUpperLeg, Part::Body),
    AnchorKey(Part::RightUpperLeg, Part::Body),
    AnchorKey(Part::LeftUpperLeg, Part::LeftLowerLeg),
    AnchorKey(Part::RightUpperLeg, Part::RightLowerLeg),
];

/// Lower-limb parts whose distal end comes from the `tip_lower` table.
pub const TIP_PARTS: [Part; 4] = [
    Part::LeftLowerArm,
    Part::RightLowerArm,
    Part::LeftLowerLeg,
    Part::RightLowerLeg,
];

/// Where one end of a peripheral segment sits in rest-pose reference space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorRef {
    /// `anchors[key].parent`.
    Parent(AnchorKey),
    /// `anchors[key].child`.
    Child(AnchorKey),
    /// `tip_lower[part]`.
    Tip(Part),
}

/// Draw-order group of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentGroup {
    Legs,
    Arms,
}

/// One peripheral limb segment: a sprite, its rest-pose endpoints, and the observed joints.
#[derive(Clone, Copy, Debug)]
pub struct LimbSegment {
    /// Sprite drawn for the segment.
    pub part: Part,
    /// Rest-pose start point.
    pub start: AnchorRef,
    /// Rest-pose end point.
    pub end: AnchorRef,
    /// Observed joint the start point follows.
    pub from: Joint,
    /// Observed joint the end point follows.
    pub to: Joint,
    /// Z-order group.
    pub group: SegmentGroup,
}

/// The eight peripheral segments, in draw order within each group.
pub const LIMB_SEGMENTS: [LimbSegment; 8] = [
    LimbSegment {
        part: Part::LeftUpperLeg,
        start: AnchorRef::Parent(AnchorKey(Part::LeftUpperLeg, Part::Body)),
        end: AnchorRef::Parent(AnchorKey(Part::LeftUpperLeg, Part::LeftLowerLeg)),
        from: Joint::LeftHip,
        to: Joint::LeftKnee,
        group: SegmentGroup::Legs,
    },
    LimbSegment {
        part: Part::LeftLowerLeg,
        start: AnchorRef::Child(AnchorKey(Part::LeftUpperLeg, Part::LeftLowerLeg)),
        end: AnchorRef::Tip(Part::LeftLowerLeg),
        from: Joint::LeftKnee,
        to: Joint::LeftAnkle,
        group: SegmentGroup::Legs,
    },
    LimbSegment {
        part: Part::RightUpperLeg,
        start: AnchorRef::Parent(AnchorKey(Part::RightUpperLeg, Part::Body)),
        end: AnchorRef::Parent(AnchorKey(Part::RightUpperLeg, Part::RightLowerLeg)),
        from: Joint::RightHip,
        to: Joint::RightKnee,
        group: SegmentGroup::Legs,
    },
    LimbSegment {
        part: Part::RightLowerLeg,
        start: AnchorRef::Child(AnchorKey(Part::RightUpperLeg, Part::RightLowerLeg)),
        end: AnchorRef::Tip(Part::RightLowerLeg),
        from: Joint::RightKnee,
        to: Joint::RightAnkle,
        group: SegmentGroup::Legs,
    },
    LimbSegment {
        part: Part::LeftUpperArm,
        start: AnchorRef::Child(AnchorKey(Part::Body, Part::LeftUpperArm)),
        end: AnchorRef::Parent(AnchorKey(Part::LeftUpperArm, Part::LeftLowerArm)),
        from: Joint::LeftShoulder,
        to: Joint::LeftElbow,
        group: SegmentGroup::Arms,
    },
    LimbSegment {
        part: Part::RightUpperArm,
        start: AnchorRef::Child(AnchorKey(Part::Body, Part::RightUpperArm)),
        end: AnchorRef::Parent(AnchorKey(Part::RightUpperArm, Part::RightLowerArm)),
        from: Joint::RightShoulder,
        to: Joint::RightElbow,
        group: SegmentGroup::Arms,
    },
    LimbSegment {
        part: Part::LeftLowerArm,
        start: AnchorRef::Child(AnchorKey(Part::LeftUpperArm, Part::LeftLowerArm)),
        end: AnchorRef::Tip(Part::LeftLowerArm),
        from: Joint::LeftElbow,
        to: Joint::LeftWrist,
        group: SegmentGroup::Arms,
    },
    LimbSegment {
        part: Part::RightLowerArm,
        start: AnchorRef::Child(AnchorKey(Part::RightUpperArm, Part::RightLowerArm)),
        end: AnchorRef::Tip(Part::RightLowerArm),
        from: Joint::RightElbow,
        to: Joint::RightWrist,
        group: SegmentGroup::Arms,
    },
];

#[cfg(test)]
#[path = "../../tests/unit/rig/part.rs"]
mod tests;
