/// Number of keypoints in one pose frame (COCO-17 layout).
pub const JOINT_COUNT: usize = 17;

/// COCO-17 body keypoints, in their wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Joint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl Joint {
    /// Position of this joint inside a keypoint array.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Left/right limb joint pairs exchanged when the pose labels are mirrored.
///
/// Face keypoints are not drawn and stay put.
pub const LR_PAIRS: [(Joint, Joint); 6] = [
    (Joint::LeftShoulder, Joint::RightShoulder),
    (Joint::LeftElbow, Joint::RightElbow),
    (Joint::LeftWrist, Joint::RightWrist),
    (Joint::LeftHip, Joint::RightHip),
    (Joint::LeftKnee, Joint::RightKnee),
    (Joint::LeftAnkle, Joint::RightAnkle),
];

/// Joints considered for the `feet` vertical alignment, most distal first.
pub const FOOT_REGION: [Joint; 6] = [
    Joint::LeftAnkle,
    Joint::RightAnkle,
    Joint::LeftKnee,
    Joint::RightKnee,
    Joint::LeftHip,
    Joint::RightHip,
];
