// THEORY:
// The `Runner` is the single-threaded, cooperative control loop that drives a
// `VisionPipeline` from a frame source. Every outside dependency is injected:
// - a `FrameSource` (camera, image sequence, scripted frames),
// - a `Display` that shows annotated frames and is polled for key presses,
// - a command sink (`io::Write`) receiving the status/command protocol,
// - a `QuitSignal` that another task can raise (Ctrl-C in the CLI).
//
// Per iteration the loop checks the quit signal, blocks on the next frame, runs
// the pipeline to completion, writes the status lines, shows the frame and
// polls for the quit key. Those two blocking calls are the only suspension
// points; cancellation is checked once per iteration, never mid-frame.
//
// The source is released through a guard, so `release()` runs exactly once on
// every exit path: quit key, quit signal, end of stream, frame limit, or a
// read/processing fault that ends the loop early. Faults are fail-fast: they are
// logged and returned, never retried.

use crate::core_modules::frame::Frame;
use crate::error::Result;
use crate::pipeline::{Report, VisionPipeline};
use std::io::Write;
use std::ops::{Deref, DerefMut};
use tokio::sync::watch;

pub const DEFAULT_QUIT_KEY: char = 'q';
pub const DEFAULT_WAIT_MS: u32 = 1;

/// A blocking producer of frames.
pub trait FrameSource {
    /// `Ok(None)` marks the end of the stream; `Err` is a failed read.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
    /// Frees the underlying device. Called exactly once by the runner.
    fn release(&mut self);
}

/// Shows frames and reports key presses.
pub trait Display {
    fn show(&mut self, window: &str, frame: &Frame, report: &Report) -> Result<()>;
    /// Waits up to `timeout_ms` for a key; `None` when nothing was pressed.
    fn wait_key(&mut self, timeout_ms: u32) -> Option<char>;
}

/// Raises the quit flag observed by a `QuitSignal`.
#[derive(Debug, Clone)]
pub struct QuitHandle {
    tx: watch::Sender<bool>,
}

impl QuitHandle {
    pub fn quit(&self) {
        self.tx.send_replace(true);
    }
}

/// Cooperative cancellation flag, checked by the runner once per iteration.
#[derive(Debug, Clone)]
pub struct QuitSignal {
    rx: watch::Receiver<bool>,
}

impl QuitSignal {
    /// A signal nobody can raise.
    pub fn never() -> Self {
        quit_channel().1
    }

    pub fn is_raised(&self) -> bool {
        *self.rx.borrow()
    }
}

pub fn quit_channel() -> (QuitHandle, QuitSignal) {
    let (tx, rx) = watch::channel(false);
    (QuitHandle { tx }, QuitSignal { rx })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuitKey,
    QuitSignal,
    EndOfStream,
    FrameLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub motion_frames: u64,
    pub commands: u64,
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub quit_key: char,
    pub wait_ms: u32,
    pub max_frames: Option<u64>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            quit_key: DEFAULT_QUIT_KEY,
            wait_ms: DEFAULT_WAIT_MS,
            max_frames: None,
        }
    }
}

/// Owns a borrowed source for the duration of a run and releases it on drop.
struct SourceGuard<'a, S: FrameSource + ?Sized> {
    source: &'a mut S,
}

impl<S: FrameSource + ?Sized> Deref for SourceGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.source
    }
}

impl<S: FrameSource + ?Sized> DerefMut for SourceGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.source
    }
}

impl<S: FrameSource + ?Sized> Drop for SourceGuard<'_, S> {
    fn drop(&mut self) {
        log::debug!("releasing frame source");
        self.source.release();
    }
}

pub struct Runner {
    pipeline: VisionPipeline,
    options: RunnerOptions,
}

impl Runner {
    pub fn new(pipeline: VisionPipeline, options: RunnerOptions) -> Self {
        Self { pipeline, options }
    }

    pub fn pipeline(&self) -> &VisionPipeline {
        &self.pipeline
    }

    pub fn run<S, D, W>(&mut self, source: &mut S, display: &mut D, sink: &mut W, quit: &QuitSignal) -> Result<RunSummary>
    where
        S: FrameSource + ?Sized,
        D: Display + ?Sized,
        W: Write + ?Sized,
    {
        let mut source = SourceGuard { source };
        let window = self.pipeline.mode().window_name();
        let mut frames = 0u64;
        let mut motion_frames = 0u64;
        let mut commands = 0u64;

        log::info!("run loop started ({:?} mode)", self.pipeline.mode());

        let stop_reason = loop {
            if quit.is_raised() {
                break StopReason::QuitSignal;
            }
            if self.options.max_frames.is_some_and(|max| frames >= max) {
                break StopReason::FrameLimit;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break StopReason::EndOfStream,
                Err(err) => {
                    log::error!("frame read failed after {} frames: {}", frames, err);
                    return Err(err);
                }
            };

            let report = self
                .pipeline
                .generate_report(&frame)
                .inspect_err(|err| log::error!("processing failed on frame {}: {}", frames + 1, err))?;
            frames += 1;
            if report.is_motion() {
                motion_frames += 1;
            }
            if report.command().is_some() {
                commands += 1;
            }

            for line in report.status_lines() {
                writeln!(sink, "{line}")?;
            }
            sink.flush()?;

            display.show(window, &self.pipeline.canonical(&frame), &report)?;
            if display.wait_key(self.options.wait_ms) == Some(self.options.quit_key) {
                break StopReason::QuitKey;
            }
        };

        log::info!("run loop stopped: {:?} after {} frames", stop_reason, frames);
        Ok(RunSummary {
            frames,
            motion_frames,
            commands,
            stop_reason,
        })
    }
}
