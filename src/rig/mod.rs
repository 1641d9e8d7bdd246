//! Skeleton vocabulary and the rig descriptor.

/// Rig descriptor parsing and validation (`anchors.json`).
pub mod descriptor;
/// The 17 tracked body joints.
pub mod joint;
/// Sprite parts, anchor keys, and limb segments.
pub mod part;
