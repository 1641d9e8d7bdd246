use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use image::RgbImage;
use rayon::prelude::*;

use crate::{
    assets::background::{build_background, load_background_source},
    assets::store::{AssetCache, SpriteBundle},
    effects::composite::KernelKind,
    encode::sink::{FrameSink, SinkConfig},
    foundation::core::{Canvas, FrameIndex},
    foundation::error::{MannequinError, MannequinResult},
    pose::sequence::{PoseFrame, load_pose_sequence},
    render::compositor::compose_frame,
    render::config::{RenderConfig, RenderOpts, canvas_size},
    rig::descriptor::ResizeMode,
};

/// Bounded channel capacity between render workers and the collector.
const CHANNEL_CAPACITY: usize = 4;

/// Lifecycle of one [`MannequinRenderer::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loading,
    Rendering,
    Completed,
    Cancelled,
    Failed,
}

/// Callbacks a run reports through. All methods default to no-ops.
///
/// `finished` is called exactly once per run whatever the outcome; `completed` only on success.
pub trait RenderObserver {
    fn progress(&mut self, _percent: u8) {}
    fn log(&mut self, _message: &str) {}
    fn error(&mut self, _message: &str) {}
    fn completed(&mut self, _output: &RenderOutput) {}
    fn finished(&mut self) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default)]
pub struct NullObserver;

impl RenderObserver for NullObserver {}

/// Caller-settable, best-effort cancellation flag.
///
/// Checked by the collector once per completed frame. Frames already being rendered finish; frames
/// not yet started are skipped.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Read-only data every worker renders from, shared once per run.
#[derive(Debug)]
pub struct WorkerPayload {
    pub sprites: Arc<SpriteBundle>,
    pub background: Arc<RgbImage>,
}

/// Per-worker state built from the shared payload when a worker starts.
#[derive(Debug)]
pub struct WorkerContext {
    payload: Arc<WorkerPayload>,
}

impl WorkerContext {
    pub fn new(payload: Arc<WorkerPayload>) -> Self {
        Self { payload }
    }
}

/// One frame of work: a transformed pose and its submission index.
#[derive(Clone, Copy, Debug)]
pub struct FrameJob {
    pub index: usize,
    pub pose: PoseFrame,
}

/// Frames of a successful run, in submission order.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    pub frames: Vec<RgbImage>,
    /// Playback rate: source fps / extractor stride / render stride.
    pub fps: f64,
}

impl RenderOutput {
    /// Push every frame into `sink`, in order.
    pub fn write_to(&self, sink: &mut dyn FrameSink) -> MannequinResult<()> {
        let first = self
            .frames
            .first()
            .ok_or_else(|| MannequinError::validation("render produced no frames"))?;
        sink.begin(SinkConfig {
            width: first.width(),
            height: first.height(),
            fps: self.fps,
        })?;
        for (i, frame) in self.frames.iter().enumerate() {
            sink.push_frame(FrameIndex(i as u64), frame)?;
        }
        sink.end()
    }
}

/// Everything the rendering phase needs, produced by the loading phase.
#[derive(Debug)]
pub struct PreparedRun {
    pub config: RenderConfig,
    pub payload: Arc<WorkerPayload>,
    pub jobs: Vec<FrameJob>,
    pub fps: f64,
}

/// Render one job on the calling thread, exactly as a pool worker would.
pub fn render_single_frame(
    config: &RenderConfig,
    worker: &WorkerContext,
    job: &FrameJob,
) -> MannequinResult<RgbImage> {
    compose_frame(
        config,
        worker.payload.sprites.as_ref(),
        &worker.payload.background,
        &job.pose,
    )
    .map_err(|e| MannequinError::render_job(job.index, e.diagnostic()))
}

/// Stride-subsample a pose stream and apply the requested coordinate transforms.
///
/// Mirroring is applied before the label swap.
pub fn build_jobs(frames: &[PoseFrame], opts: &RenderOpts, ref_w: u32) -> Vec<FrameJob> {
    frames
        .iter()
        .step_by(opts.stride.max(1) as usize)
        .map(|f| {
            let mut pose = *f;
            if opts.hflip {
                pose = pose.hflip(ref_w);
            }
            if opts.swap_lr {
                pose = pose.swap_lr();
            }
            pose
        })
        .enumerate()
        .map(|(index, pose)| FrameJob { index, pose })
        .collect()
}

/// Build a rayon pool with `threads` workers, or rayon's default count.
pub fn build_thread_pool(threads: Option<usize>) -> MannequinResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(MannequinError::validation("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MannequinError::validation(format!("failed to build rayon thread pool: {e}")))
}

/// Pose-to-video renderer for one pose document and one asset directory.
#[derive(Debug)]
pub struct MannequinRenderer {
    pose_path: PathBuf,
    assets_dir: PathBuf,
    opts: RenderOpts,
    state: RunState,
    cancel: CancelToken,
}

impl MannequinRenderer {
    pub fn new(
        pose_path: impl Into<PathBuf>,
        assets_dir: impl Into<PathBuf>,
        opts: RenderOpts,
    ) -> Self {
        Self {
            pose_path: pose_path.into(),
            assets_dir: assets_dir.into(),
            opts,
            state: RunState::Idle,
            cancel: CancelToken::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Handle that cancels this renderer's runs from any thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Request cancellation of the current run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Load assets and pose data and build the job list, without rendering.
    #[tracing::instrument(skip(self, cache, observer), fields(assets = %self.assets_dir.display()))]
    pub fn prepare(
        &self,
        cache: &AssetCache,
        observer: &mut dyn RenderObserver,
    ) -> MannequinResult<PreparedRun> {
        self.opts.validate()?;

        let pack = cache.get_or_load(&self.assets_dir)?;
        let rig = &pack.rig;
        emit_log(
            observer,
            &format!(
                "assets ready: {} ({}x{} reference)",
                self.assets_dir.display(),
                rig.ref_size.width,
                rig.ref_size.height
            ),
        );

        let source = load_background_source(&rig.background, &self.assets_dir)?;
        let canvas = match (&source, rig.background.resize) {
            (Some(img), ResizeMode::Native) => Canvas::new(img.width(), img.height())?,
            _ => canvas_size(rig.ref_size, self.opts.side_pad, self.opts.top_pad)?,
        };
        let background = build_background(&rig.background, source.as_ref(), canvas)?;
        emit_log(
            observer,
            &format!("canvas {}x{}", canvas.width, canvas.height),
        );

        let seq = load_pose_sequence(&self.pose_path, rig.ref_size)?;
        let config = RenderConfig::new(rig, &self.assets_dir, &self.opts, canvas)?;
        let jobs = build_jobs(&seq.frames, &self.opts, rig.ref_size.width);
        let fps = seq.effective_fps() / f64::from(self.opts.stride);
        emit_log(
            observer,
            &format!(
                "{} of {} pose frames queued at {fps:.3} fps",
                jobs.len(),
                seq.len()
            ),
        );

        Ok(PreparedRun {
            config,
            payload: Arc::new(WorkerPayload {
                sprites: Arc::clone(&pack.sprites),
                background: Arc::new(background),
            }),
            jobs,
            fps,
        })
    }

    /// Render every job and report through `observer`.
    ///
    /// Returns the ordered frames on success, [`MannequinError::Cancelled`] after a cancellation,
    /// or the first error. `observer.finished()` is called before returning in all cases.
    #[tracing::instrument(skip(self, cache, observer), fields(pose = %self.pose_path.display()))]
    pub fn run(
        &mut self,
        cache: &AssetCache,
        observer: &mut dyn RenderObserver,
    ) -> MannequinResult<RenderOutput> {
        self.state = RunState::Loading;
        let res = self.run_inner(cache, observer);
        self.state = match &res {
            Ok(_) => RunState::Completed,
            Err(MannequinError::Cancelled) => {
                tracing::warn!("render cancelled");
                observer.log("[warn] render cancelled");
                RunState::Cancelled
            }
            Err(e) => {
                let msg = e.diagnostic();
                tracing::error!("{msg}");
                observer.error(&msg);
                RunState::Failed
            }
        };
        observer.finished();
        res
    }

    fn run_inner(
        &mut self,
        cache: &AssetCache,
        observer: &mut dyn RenderObserver,
    ) -> MannequinResult<RenderOutput> {
        let prepared = self.prepare(cache, observer)?;
        if self.cancel.is_cancelled() {
            return Err(MannequinError::Cancelled);
        }

        self.state = RunState::Rendering;
        let kernel: KernelKind = prepared.config.kernel;
        emit_log(
            observer,
            &format!("rendering with '{}' blend kernel", kernel.kernel().name()),
        );
        let frames = render_parallel(&prepared, self.opts.threads, &self.cancel, observer)?;

        if self.cancel.is_cancelled() {
            return Err(MannequinError::Cancelled);
        }
        let output = RenderOutput {
            frames,
            fps: prepared.fps,
        };
        observer.completed(&output);
        Ok(output)
    }

    /// Render the `index`-th job (after stride) on the calling thread.
    pub fn render_frame(&self, cache: &AssetCache, index: usize) -> MannequinResult<RgbImage> {
        let prepared = self.prepare(cache, &mut NullObserver)?;
        let job = prepared.jobs.get(index).ok_or_else(|| {
            MannequinError::validation(format!(
                "frame {index} is out of range (0..{})",
                prepared.jobs.len()
            ))
        })?;
        let worker = WorkerContext::new(Arc::clone(&prepared.payload));
        render_single_frame(&prepared.config, &worker, job)
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: RgbImage,
}

fn emit_log(observer: &mut dyn RenderObserver, msg: &str) {
    tracing::info!("{msg}");
    observer.log(msg);
}

/// Fan jobs out over a worker pool and collect frames back into submission order.
fn render_parallel(
    prepared: &PreparedRun,
    threads: Option<usize>,
    cancel: &CancelToken,
    observer: &mut dyn RenderObserver,
) -> MannequinResult<Vec<RgbImage>> {
    let total = prepared.jobs.len();
    if total == 0 {
        observer.progress(100);
        return Ok(Vec::new());
    }

    let pool = build_thread_pool(threads)?;
    let abort = AtomicBool::new(false);

    std::thread::scope(|scope| -> MannequinResult<Vec<RgbImage>> {
        let (tx, rx) = mpsc::sync_channel::<FrameMsg>(CHANNEL_CAPACITY);
        let config = &prepared.config;
        let payload = &prepared.payload;
        let jobs = &prepared.jobs;
        let abort_ref = &abort;
        let pool_ref = &pool;

        let producer = scope.spawn(move || -> MannequinResult<()> {
            pool_ref.install(|| {
                jobs.par_iter().try_for_each_init(
                    || WorkerContext::new(Arc::clone(payload)),
                    |worker, job| -> MannequinResult<()> {
                        if abort_ref.load(Ordering::Relaxed) {
                            return Ok(());
                        }
                        let frame = render_single_frame(config, worker, job).inspect_err(|_| {
                            abort_ref.store(true, Ordering::Relaxed);
                        })?;
                        tx.send(FrameMsg {
                            idx: FrameIndex(job.index as u64),
                            frame,
                        })
                        .map_err(|_| {
                            MannequinError::validation("frame collector is not accepting frames")
                        })
                    },
                )
            })
        });

        let mut slots: Vec<Option<RgbImage>> = (0..total).map(|_| None).collect();
        let mut done = 0usize;
        let mut cancelled = false;
        while done < total {
            let Ok(msg) = rx.recv() else {
                break;
            };
            if cancel.is_cancelled() {
                abort.store(true, Ordering::Relaxed);
                cancelled = true;
                break;
            }

            let slot = slots
                .get_mut(msg.idx.0 as usize)
                .ok_or_else(|| MannequinError::validation("frame index out of range"))?;
            *slot = Some(msg.frame);
            done += 1;
            observer.progress((done * 100 / total) as u8);
        }
        drop(rx);

        let produced = producer
            .join()
            .map_err(|_| MannequinError::validation("render worker pool panicked"))?;
        if cancelled {
            return Err(MannequinError::Cancelled);
        }
        produced?;

        slots
            .into_iter()
            .enumerate()
            .map(|(i, f)| {
                f.ok_or_else(|| MannequinError::render_job(i, "frame was never delivered"))
            })
            .collect()
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/orchestrator.rs"]
mod tests;
