//! Pose documents.

/// Pose frames and sequences.
pub mod sequence;
