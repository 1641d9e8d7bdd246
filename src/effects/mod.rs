//! Pixel-level effects.

/// Separable Gaussian blur for backgrounds.
pub mod blur;
/// Alpha compositing kernels.
pub mod composite;
