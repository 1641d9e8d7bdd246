use image::RgbImage;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MannequinError, MannequinResult};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback rate.
    pub fps: f64,
}

impl SinkConfig {
    /// Reject empty frames and non-positive rates.
    pub fn validate(&self) -> MannequinResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MannequinError::validation("sink width/height must be non-zero"));
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(MannequinError::validation(format!(
                "sink fps must be > 0, got {}",
                self.fps
            )));
        }
        Ok(())
    }
}

/// Consumer of rendered frames.
///
/// Ordering contract: `push_frame` is called with strictly increasing `FrameIndex` values.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> MannequinResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &RgbImage) -> MannequinResult<()>;
    fn end(&mut self) -> MannequinResult<()>;
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    /// Received frames in order.
    pub frames: Vec<(FrameIndex, RgbImage)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// `true` once `end` has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MannequinResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RgbImage) -> MannequinResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MannequinError::validation("in-memory sink not started"))?;
        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(MannequinError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(MannequinError::validation(
                "in-memory sink received out-of-order frame index",
            ));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> MannequinResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
