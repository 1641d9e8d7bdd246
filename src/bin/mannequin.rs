use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use mannequin::encode::ffmpeg::TempFileGuard;
use mannequin::{
    AssetCache, FfmpegSink, FfmpegSinkOpts, KernelKind, MannequinRenderer, RenderObserver,
    RenderOpts,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mannequin", version)]
struct Cli {
    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Pose document JSON.
    #[arg(long)]
    pose: PathBuf,

    /// Asset directory containing `anchors.json` and the part sprites.
    #[arg(long)]
    assets: PathBuf,

    /// Extra canvas width on each side of the reference canvas.
    #[arg(long, default_value_t = 240)]
    side_pad: u32,

    /// Extra canvas height above the reference canvas.
    #[arg(long, default_value_t = 100, allow_hyphen_values = true)]
    top_pad: i32,

    /// Horizontal offset used when the hips are not followed.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset_x: i32,

    /// Render every n-th pose frame.
    #[arg(long, default_value_t = 1)]
    stride: u32,

    /// Do not mark joints.
    #[arg(long)]
    no_debug: bool,

    /// Keep a fixed horizontal offset instead of following the hips.
    #[arg(long)]
    no_follow_center: bool,

    /// Keep left/right joint labels as recorded.
    #[arg(long)]
    no_swap_lr: bool,

    /// Mirror the pose horizontally.
    #[arg(long)]
    hflip: bool,

    /// Blend kernel override.
    #[arg(long, value_enum)]
    kernel: Option<KernelChoice>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Frame index after stride (0-based).
    #[arg(long)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Reference video whose audio track is copied into the output.
    #[arg(long)]
    audio_from: Option<PathBuf>,

    /// Worker threads (defaults to one per core).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KernelChoice {
    PerPixel,
    Uniform,
}

impl From<KernelChoice> for KernelKind {
    fn from(k: KernelChoice) -> Self {
        match k {
            KernelChoice::PerPixel => KernelKind::PerPixel,
            KernelChoice::Uniform => KernelKind::Uniform,
        }
    }
}

impl InputArgs {
    fn opts(&self, threads: Option<usize>) -> RenderOpts {
        RenderOpts {
            side_pad: self.side_pad,
            top_pad: self.top_pad,
            offset_x: self.offset_x,
            stride: self.stride,
            show_debug: !self.no_debug,
            follow_center: !self.no_follow_center,
            swap_lr: !self.no_swap_lr,
            hflip: self.hflip,
            threads,
            kernel: self.kernel.map(KernelKind::from),
        }
    }
}

/// Prints percent progress on one stderr line.
struct StderrProgress {
    last: Option<u8>,
}

impl RenderObserver for StderrProgress {
    fn progress(&mut self, percent: u8) {
        if self.last == Some(percent) {
            return;
        }
        self.last = Some(percent);
        eprint!("\rrendering {percent:>3}%");
        let _ = std::io::stderr().flush();
    }

    fn finished(&mut self) {
        if self.last.is_some() {
            eprintln!();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "mannequin=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cache = AssetCache::new();
    let renderer = MannequinRenderer::new(
        &args.input.pose,
        &args.input.assets,
        args.input.opts(Some(1)),
    );
    let frame = renderer.render_frame(&cache, args.index)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cache = AssetCache::new();
    let mut renderer = MannequinRenderer::new(
        &args.input.pose,
        &args.input.assets,
        args.input.opts(args.threads),
    );
    let output = renderer.run(&cache, &mut StderrProgress { last: None })?;

    let Some(audio) = args.audio_from.as_deref() else {
        encode(&output, &args.out)?;
        eprintln!("wrote {}", args.out.display());
        return Ok(());
    };

    let silent = silent_video_path(&args.out);
    let _guard = TempFileGuard(Some(silent.clone()));
    encode(&output, &silent)?;
    mannequin::mux_audio(&silent, Some(audio), &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn encode(output: &mannequin::RenderOutput, out: &Path) -> anyhow::Result<()> {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out));
    output
        .write_to(&mut sink)
        .with_context(|| format!("encode '{}'", out.display()))?;
    Ok(())
}

fn silent_video_path(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_owned());
    out.with_file_name(format!("{stem}.silent.mp4"))
}
