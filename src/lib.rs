//! Mannequin renders a rigged 2D sprite avatar whose limbs follow recorded body-joint motion.
//!
//! - Load an asset pack (rig descriptor plus part sprites) through an [`AssetCache`]
//! - Create a [`MannequinRenderer`] for a pose document
//! - Run it to get ordered frames, then stream them into a [`FrameSink`]
#![forbid(unsafe_code)]

pub mod assets;
pub mod effects;
pub mod encode;
pub mod foundation;
pub mod pose;
pub mod render;
pub mod rig;

pub use crate::assets::store::{AssetCache, AssetPack, SpriteBundle};
pub use crate::effects::composite::{BlendKernel, KernelKind};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, mux_audio};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::foundation::core::{Affine, Canvas, FrameIndex, Point, Rgb8, Vec2};
pub use crate::foundation::error::{MannequinError, MannequinResult};
pub use crate::pose::sequence::{PoseFrame, PoseSequence, load_pose_sequence};
pub use crate::render::compositor::compose_frame;
pub use crate::render::config::{RenderConfig, RenderOpts};
pub use crate::render::orchestrator::{
    CancelToken, MannequinRenderer, NullObserver, RenderObserver, RenderOutput, RunState,
};
pub use crate::rig::descriptor::Rig;
pub use crate::rig::joint::Joint;
pub use crate::rig::part::Part;
