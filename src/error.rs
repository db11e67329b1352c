// THEORY:
// A single error vocabulary for the whole engine. The taxonomy mirrors how the
// run loop reacts to a failure:
// - `SourceOpen` is a setup failure: nothing has been processed yet and the
//   process should exit before entering the loop.
// - `FrameRead`, `MalformedFrame`, `EmptyFrame` and `SizeMismatch` are per-frame
//   faults. The loop logs them and terminates (fail-fast), releasing the source
//   on the way out.
// - Everything else is plumbing (configuration, persistence, display).
//
// Degenerate geometry (zero-area contours, nothing in range) is deliberately
// absent: it is a normal "nothing to report" outcome, modelled with `Option`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("failed to open frame source: {0}")]
    SourceOpen(String),

    #[error("failed to read frame: {0}")]
    FrameRead(String),

    #[error("malformed frame: expected {expected} bytes for {width}x{height}x{channels}, got {actual}")]
    MalformedFrame {
        width: u32,
        height: u32,
        channels: usize,
        expected: usize,
        actual: usize,
    },

    #[error("empty frame: {width}x{height} has no pixels")]
    EmptyFrame { width: u32, height: u32 },

    #[error("frame size changed mid-stream: expected {expected:?}, got {actual:?}")]
    SizeMismatch { expected: (u32, u32), actual: (u32, u32) },

    #[error("unsupported channel layout: {0}")]
    UnsupportedLayout(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("display error: {0}")]
    Display(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("OpenCV error: {0}")]
    OpenCv(String),
}

#[cfg(feature = "camera")]
impl From<opencv::Error> for VisionError {
    fn from(err: opencv::Error) -> Self {
        VisionError::OpenCv(err.message)
    }
}

pub type Result<T> = std::result::Result<T, VisionError>;
