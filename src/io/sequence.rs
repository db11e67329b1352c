// THEORY:
// `ImageSequenceSource` replays a directory of still images as a video stream.
// Files are ordered by name, so zero-padded numbering (`frame_0001.png`, ...)
// gives chronological order. Only files with a known image extension are
// considered; anything else in the directory is ignored.
//
// An empty or unreadable directory is a setup failure (`SourceOpen`). A file
// that fails to decode mid-stream is a per-frame read failure (`FrameRead`).

use crate::core_modules::frame::Frame;
use crate::error::{Result, VisionError};
use crate::runner::FrameSource;
use std::path::{Path, PathBuf};

const EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
    released: bool,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .map_err(|err| VisionError::SourceOpen(format!("{}: {}", dir.display(), err)))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(VisionError::SourceOpen(format!("no images found in {}", dir.display())));
        }
        log::info!("replaying {} images from {}", paths.len(), dir.display());
        Ok(Self::from_paths(paths))
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            next: 0,
            released: false,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.released {
            return Err(VisionError::FrameRead("image sequence already released".into()));
        }
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        let image = image::open(path).map_err(|err| VisionError::FrameRead(format!("{}: {}", path.display(), err)))?;
        Ok(Some(Frame::from_dynamic(image)))
    }

    fn release(&mut self) {
        self.released = true;
    }
}
