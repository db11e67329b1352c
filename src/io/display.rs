// THEORY:
// Window-less `Display` implementations.
// - `HeadlessDisplay` discards frames and replays a scripted key sequence; with
//   no script it never reports a key, so the loop runs until the source ends.
// - `SnapshotDisplay` writes the annotated frame to disk as PNG, optionally only
//   every n-th frame, which is how a run is inspected on a machine without a
//   screen.

use crate::core_modules::frame::Frame;
use crate::core_modules::utils::image_helper::image_helper;
use crate::error::{Result, VisionError};
use crate::pipeline::Report;
use crate::runner::Display;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    keys: VecDeque<Option<char>>,
    shown: u64,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per `wait_key` call; exhausted scripts report no key.
    pub fn with_keys(keys: impl IntoIterator<Item = Option<char>>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            shown: 0,
        }
    }

    pub fn shown(&self) -> u64 {
        self.shown
    }
}

impl Display for HeadlessDisplay {
    fn show(&mut self, _window: &str, _frame: &Frame, _report: &Report) -> Result<()> {
        self.shown += 1;
        Ok(())
    }

    fn wait_key(&mut self, _timeout_ms: u32) -> Option<char> {
        self.keys.pop_front().flatten()
    }
}

pub struct SnapshotDisplay {
    dir: PathBuf,
    every: u64,
    seen: u64,
    written: Vec<PathBuf>,
}

impl SnapshotDisplay {
    pub fn new(dir: &Path) -> Result<Self> {
        Self::every(dir, 1)
    }

    /// Keeps one frame in `every`.
    pub fn every(dir: &Path, every: u64) -> Result<Self> {
        if every == 0 {
            return Err(VisionError::Display("snapshot interval must be positive".into()));
        }
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            every,
            seen: 0,
            written: Vec::new(),
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Display for SnapshotDisplay {
    fn show(&mut self, window: &str, frame: &Frame, report: &Report) -> Result<()> {
        self.seen += 1;
        if (self.seen - 1) % self.every != 0 {
            return Ok(());
        }
        let path = self.dir.join(format!("{}-{:06}.png", window, self.seen));
        let annotated = Frame::from_rgb_image(report.annotate(frame));
        image_helper::save_png(&path, &annotated)?;
        log::debug!("wrote snapshot {}", path.display());
        self.written.push(path);
        Ok(())
    }

    fn wait_key(&mut self, _timeout_ms: u32) -> Option<char> {
        None
    }
}
