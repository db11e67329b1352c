// The `scout_vision` command-line front end. It wires the library's pipeline and
// run loop to real collaborators: an image directory, a scripted demo scene, or
// (with the `camera` feature) a webcam or video file.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use scout_vision::config::VisionConfig;
use scout_vision::core_modules::calibration;
use scout_vision::core_modules::frame::Frame;
use scout_vision::core_modules::mask::HsvRange;
use scout_vision::core_modules::pixel::pixel::Hsv;
use scout_vision::io::synthetic::{self, SyntheticSource};
use scout_vision::io::{HeadlessDisplay, ImageSequenceSource, SnapshotDisplay};
use scout_vision::runner::{self, Display, FrameSource, QuitSignal};
use scout_vision::{Mode, RunSummary, Runner, RunnerOptions, VisionPipeline};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Motion detection and colour-guided tracking for video streams")]
struct Cli {
    /// TOML file overriding the built-in defaults.
    #[arg(long, env = "SCOUT_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report "Normal" / "Moving Object detected" for every frame.
    Motion {
        #[command(flatten)]
        source: SourceArgs,
        /// Canonical working width in pixels.
        #[arg(long)]
        width: Option<u32>,
        /// Minimum region area in px².
        #[arg(long)]
        min_area: Option<f64>,
        /// Minimum per-pixel intensity change.
        #[arg(long)]
        threshold: Option<u8>,
    },
    /// Track one coloured object and emit Left / Right / Front / Stop.
    Track {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        width: Option<u32>,
        /// Lower HSV bound, e.g. "100,100,100".
        #[arg(long, value_parser = parse_hsv)]
        lower: Option<Hsv>,
        /// Upper HSV bound, e.g. "120,255,255".
        #[arg(long, value_parser = parse_hsv)]
        upper: Option<Hsv>,
    },
    /// Sample the HSV range of one pixel of an image.
    Calibrate {
        image: PathBuf,
        #[arg(long)]
        x: u32,
        #[arg(long)]
        y: u32,
        #[arg(long, default_value_t = calibration::DEFAULT_HUE_WINDOW)]
        hue_window: u8,
    },
    /// Capture a dataset of cropped greyscale faces from the camera, or only
    /// show live detections with `--view`.
    #[cfg(feature = "camera")]
    Faces {
        #[arg(long, default_value = "dataset")]
        dataset: PathBuf,
        #[arg(long, default_value = "snapd")]
        name: String,
        #[arg(long, default_value = "dataset/haarcascade_frontalface_default.xml")]
        cascade: String,
        #[arg(long, default_value_t = scout_vision::core_modules::face_capture::DEFAULT_TARGET)]
        count: u32,
        #[arg(long, default_value_t = 0)]
        camera: i32,
        /// Draw detections in a window until 'q' is pressed; nothing is saved.
        #[arg(long)]
        view: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Directory of still images replayed in name order.
    #[arg(long, conflicts_with = "demo")]
    input: Option<PathBuf>,

    /// Run on a generated scene instead of real input.
    #[arg(long)]
    demo: bool,

    /// Camera device index.
    #[cfg(feature = "camera")]
    #[arg(long, default_value_t = 0)]
    camera: i32,

    /// Video file to read instead of a camera.
    #[cfg(feature = "camera")]
    #[arg(long, conflicts_with = "input")]
    video: Option<String>,

    /// Write annotated frames as PNG into this directory.
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// Keep one snapshot every N frames.
    #[arg(long, default_value_t = 1)]
    snapshot_every: u64,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Never open a window.
    #[arg(long)]
    headless: bool,
}

fn parse_hsv(raw: &str) -> std::result::Result<Hsv, String> {
    let parts: Vec<&str> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    let [h, s, v] = parts.as_slice() else {
        return Err(format!("expected three values \"h,s,v\", got {raw:?}"));
    };
    let channel = |p: &str| p.parse::<u8>().map_err(|e| format!("{p:?}: {e}"));
    Ok(Hsv::new(channel(*h)?, channel(*s)?, channel(*v)?))
}

fn load_config(path: Option<&PathBuf>) -> Result<VisionConfig> {
    match path {
        Some(path) => VisionConfig::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(VisionConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Motion {
            source,
            width,
            min_area,
            threshold,
        } => {
            let motion = &mut config.motion;
            motion.frame_width = width.unwrap_or(motion.frame_width);
            motion.min_area = min_area.unwrap_or(motion.min_area);
            motion.diff_threshold = threshold.unwrap_or(motion.diff_threshold);
            config.validate()?;
            run(Mode::Motion, config, source).await
        }
        Commands::Track {
            source,
            width,
            lower,
            upper,
        } => {
            let tracking = &mut config.tracking;
            tracking.frame_width = width.unwrap_or(tracking.frame_width);
            tracking.range = HsvRange::new(
                lower.unwrap_or(tracking.range.lower),
                upper.unwrap_or(tracking.range.upper),
            );
            config.validate()?;
            run(Mode::Tracking, config, source).await
        }
        Commands::Calibrate {
            image,
            x,
            y,
            hue_window,
        } => calibrate(&image, (x, y), hue_window),
        #[cfg(feature = "camera")]
        Commands::Faces {
            dataset,
            name,
            cascade,
            count,
            camera,
            view,
        } => {
            if view {
                faces::view(&cascade, camera)
            } else {
                faces::capture(&dataset, &name, &cascade, count, camera)
            }
        }
    }
}

async fn run(mode: Mode, config: VisionConfig, args: SourceArgs) -> Result<()> {
    let (handle, quit) = runner::quit_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("interrupt received, stopping after the current frame");
            handle.quit();
        }
    });

    let summary = tokio::task::spawn_blocking(move || run_blocking(mode, &config, &args, &quit))
        .await
        .context("run loop panicked")??;

    log::info!(
        "processed {} frames ({} with motion, {} commands), stopped by {:?}",
        summary.frames,
        summary.motion_frames,
        summary.commands,
        summary.stop_reason
    );
    Ok(())
}

fn run_blocking(mode: Mode, config: &VisionConfig, args: &SourceArgs, quit: &QuitSignal) -> Result<RunSummary> {
    let mut source = open_source(mode, args)?;
    let mut display = open_display(args)?;
    let options = RunnerOptions {
        max_frames: args.max_frames,
        ..RunnerOptions::default()
    };
    let mut runner = Runner::new(VisionPipeline::new(mode, config), options);
    let stdout = std::io::stdout();
    let mut sink = stdout.lock();
    Ok(runner.run(source.as_mut(), display.as_mut(), &mut sink, quit)?)
}

fn open_source(mode: Mode, args: &SourceArgs) -> Result<Box<dyn FrameSource>> {
    if args.demo {
        return Ok(Box::new(demo_scene(mode)));
    }
    if let Some(dir) = &args.input {
        return Ok(Box::new(ImageSequenceSource::open(dir)?));
    }
    open_device_source(args)
}

#[cfg(feature = "camera")]
fn open_device_source(args: &SourceArgs) -> Result<Box<dyn FrameSource>> {
    use scout_vision::io::CameraSource;
    let source = match &args.video {
        Some(path) => CameraSource::open_file(path)?,
        None => CameraSource::open_device(args.camera)?,
    };
    Ok(Box::new(source))
}

#[cfg(not(feature = "camera"))]
fn open_device_source(_args: &SourceArgs) -> Result<Box<dyn FrameSource>> {
    Err(anyhow!("no input given: pass --input <dir> or --demo (camera support needs the `camera` feature)"))
}

fn open_display(args: &SourceArgs) -> Result<Box<dyn Display>> {
    if let Some(dir) = &args.snapshots {
        return Ok(Box::new(SnapshotDisplay::every(dir, args.snapshot_every)?));
    }
    if !args.headless {
        if let Some(window) = window_display() {
            return Ok(window);
        }
    }
    Ok(Box::new(HeadlessDisplay::new()))
}

#[cfg(feature = "camera")]
fn window_display() -> Option<Box<dyn Display>> {
    Some(Box::new(scout_vision::io::WindowDisplay::new()))
}

#[cfg(not(feature = "camera"))]
fn window_display() -> Option<Box<dyn Display>> {
    None
}

/// A short generated scene: a block crossing a still backdrop for motion, a
/// blue disk sweeping left to right and approaching for tracking.
fn demo_scene(mode: Mode) -> SyntheticSource {
    let backdrop = synthetic::backdrop(640, 480, [90, 90, 90]);
    let frames: Vec<Frame> = match mode {
        Mode::Motion => std::iter::once(backdrop.clone())
            .chain((0..12).map(|i| synthetic::with_block(&backdrop, 40 + i * 45, 200, 60, 60, [230, 230, 230])))
            .collect(),
        Mode::Tracking => (0..16)
            .map(|i| synthetic::with_disk(&backdrop, (30 + i * 38, 240), 12 + i * 12, [20, 40, 220]))
            .collect(),
    };
    SyntheticSource::new(frames)
}

fn calibrate(image: &PathBuf, point: (u32, u32), hue_window: u8) -> Result<()> {
    let frame = Frame::from_dynamic(image::open(image).with_context(|| format!("opening {}", image.display()))?);
    let range = calibration::sample_hsv_bounds(&frame, point, hue_window).ok_or_else(|| {
        anyhow!(
            "point ({}, {}) lies outside the {}x{} image",
            point.0,
            point.1,
            frame.width(),
            frame.height()
        )
    })?;
    println!("Lower limit: {}", calibration::format_hsv(range.lower));
    println!("Upper limit: {}", calibration::format_hsv(range.upper));
    println!();
    print!("{}", calibration::toml_snippet(&range));
    Ok(())
}

#[cfg(feature = "camera")]
mod faces {
    use anyhow::Result;
    use scout_vision::core_modules::face_capture::{self, FaceCapture};
    use scout_vision::io::{CameraSource, CascadeFaceDetector, WindowDisplay};
    use scout_vision::runner::{Display, FrameSource};
    use std::path::Path;

    const WINDOW: &str = "FaceDetection";
    const VIEW_WINDOW: &str = "Face Detection";
    const WAIT_MS: u32 = 10;
    const VIEW_WAIT_MS: u32 = 1;
    const ESCAPE: char = '\u{1b}';
    const QUIT: char = 'q';

    /// Live detection only: boxes drawn on the colour feed, no files written.
    pub fn view(cascade: &str, camera: i32) -> Result<()> {
        let mut detector = CascadeFaceDetector::load(cascade)?;
        let mut source = CameraSource::open_device(camera)?;
        let mut window = WindowDisplay::new();

        let outcome = (|| -> Result<()> {
            while let Some(frame) = source.next_frame()? {
                let faces = face_capture::detect_faces(&frame, &mut detector)?;
                log::debug!("{} faces in view", faces.len());
                window.show_image(VIEW_WINDOW, &face_capture::annotate_faces(&frame, &faces))?;
                if window.wait_key(VIEW_WAIT_MS) == Some(QUIT) {
                    break;
                }
            }
            Ok(())
        })();
        source.release();
        outcome
    }

    pub fn capture(dataset: &Path, name: &str, cascade: &str, target: u32, camera: i32) -> Result<()> {
        let mut detector = CascadeFaceDetector::load(cascade)?;
        let mut capture = FaceCapture::new(dataset, name, target)?;
        let mut source = CameraSource::open_device(camera)?;
        let mut window = WindowDisplay::new();

        let outcome = (|| -> Result<()> {
            while !capture.is_complete() {
                let Some(frame) = source.next_frame()? else {
                    break;
                };
                let faces = capture.capture(&frame, &mut detector)?;
                log::info!("{} of {} faces saved", capture.saved(), target);

                window.show_image(WINDOW, &face_capture::annotate_faces(&frame, &faces))?;
                if window.wait_key(WAIT_MS) == Some(ESCAPE) {
                    break;
                }
            }
            Ok(())
        })();
        source.release();
        outcome?;

        println!("Images captured successfully");
        Ok(())
    }
}
