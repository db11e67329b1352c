// THEORY:
// Concrete collaborators for the run loop. The engine itself only knows the
// `FrameSource` and `Display` traits; everything that touches files, windows or
// devices lives here, and the OpenCV-backed pieces only exist with the
// `camera` feature.

pub mod display;
pub mod sequence;
pub mod synthetic;

#[cfg(feature = "camera")]
pub mod camera;

pub use display::{HeadlessDisplay, SnapshotDisplay};
pub use sequence::ImageSequenceSource;
pub use synthetic::SyntheticSource;

#[cfg(feature = "camera")]
pub use camera::{CameraSource, CascadeFaceDetector, WindowDisplay};
