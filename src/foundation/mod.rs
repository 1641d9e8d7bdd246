//! Shared value types, the error taxonomy, and small geometry helpers.

/// Canvas sizes, colors, frame indices, and point helpers.
pub mod core;
/// Error taxonomy.
pub mod error;
/// Affine solves and vector helpers.
pub mod math;
