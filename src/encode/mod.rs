//! Encoding sinks.
//!
//! Sinks consume rendered frames in output order.

/// `ffmpeg`-based MP4 output and audio muxing.
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
