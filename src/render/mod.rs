//! Per-frame compositing and the parallel render run.
//!
//! [`config::RenderConfig`] is resolved once per run; [`compositor::compose_frame`] turns one pose
//! into one frame; [`orchestrator::MannequinRenderer`] fans frames out over a worker pool.

/// Frame compositing.
pub mod compositor;
/// Renderer options and per-run geometry.
pub mod config;
/// Run orchestration, observers, and cancellation.
pub mod orchestrator;
/// Body placement on the output canvas.
pub mod placement;
/// Nearest-neighbour affine sprite warp.
pub mod warp;
