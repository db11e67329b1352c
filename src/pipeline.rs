// THEORY:
// The `pipeline` module is the top-level API of the vision engine. It hides the
// analytical building blocks behind one object: hand it a raw frame, get back a
// `Report` describing what happened in that frame.
//
// A pipeline runs in exactly one mode for its whole life:
// - `Motion`: frame differencing against the session baseline.
// - `Tracking`: colour segmentation of one object plus a steering command.
//
// Every report renders to the stable, line-oriented actuator protocol through
// `status_lines()`. That protocol is the contract with downstream consumers, so
// it lives here and not in whichever binary happens to print it.

use crate::config::VisionConfig;
use crate::core_modules::color_tracker::ColorTracker;
use crate::core_modules::frame::Frame;
use crate::core_modules::motion_detector::MotionDetector;
use crate::core_modules::utils::image_helper::image_helper;
use crate::error::Result;
use image::RgbImage;

// Re-export key data structures for the public API.
pub use crate::core_modules::color_tracker::{TrackedObject, TrackingResult};
pub use crate::core_modules::direction_policy::Command;
pub use crate::core_modules::mask::HsvRange;
pub use crate::core_modules::motion_detector::{DetectionResult, MotionLabel};

const BOX_THICKNESS: u32 = 2;
const RING_THICKNESS: u32 = 2;
const CENTROID_DOT_RADIUS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Motion,
    Tracking,
}

impl Mode {
    /// Window the annotated frames of this mode are shown in.
    pub fn window_name(self) -> &'static str {
        match self {
            Mode::Motion => "cameraFeed",
            Mode::Tracking => "Frame",
        }
    }
}

/// The output of the vision pipeline for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Motion(DetectionResult),
    Tracking(TrackingResult),
}

impl Report {
    /// Lines for the command sink: one status line per motion frame, the
    /// command word (if any) per tracking frame.
    pub fn status_lines(&self) -> Vec<&'static str> {
        match self {
            Report::Motion(result) => vec![result.label.status_line()],
            Report::Tracking(result) => result.command.as_str().into_iter().collect(),
        }
    }

    pub fn is_motion(&self) -> bool {
        matches!(self, Report::Motion(result) if result.is_motion())
    }

    pub fn command(&self) -> Option<Command> {
        match self {
            Report::Tracking(result) if result.command != Command::None => Some(result.command),
            _ => None,
        }
    }

    /// Draws the report onto a copy of `frame`, which must be the canonical-width
    /// frame the report's coordinates refer to.
    pub fn annotate(&self, frame: &Frame) -> RgbImage {
        let mut canvas = frame.to_rgb_image();
        match self {
            Report::Motion(result) => {
                for region in &result.regions {
                    image_helper::draw_box(&mut canvas, region, image_helper::GREEN, BOX_THICKNESS);
                }
            }
            Report::Tracking(TrackingResult {
                object: Some(object),
                command,
                ..
            }) if *command != Command::None => {
                image_helper::draw_ring(
                    &mut canvas,
                    object.circle_center,
                    object.radius,
                    image_helper::YELLOW,
                    RING_THICKNESS,
                );
                image_helper::draw_dot(&mut canvas, object.center, CENTROID_DOT_RADIUS, image_helper::RED);
            }
            Report::Tracking(_) => {}
        }
        canvas
    }
}

enum Engine {
    Motion(MotionDetector),
    Tracking(ColorTracker),
}

/// The main, top-level struct for the vision engine.
pub struct VisionPipeline {
    engine: Engine,
    frame_width: u32,
}

impl VisionPipeline {
    pub fn new(mode: Mode, config: &VisionConfig) -> Self {
        match mode {
            Mode::Motion => Self::motion(config),
            Mode::Tracking => Self::tracking(config),
        }
    }

    pub fn motion(config: &VisionConfig) -> Self {
        Self {
            frame_width: config.motion.frame_width,
            engine: Engine::Motion(MotionDetector::new(config.motion.clone())),
        }
    }

    pub fn tracking(config: &VisionConfig) -> Self {
        Self {
            frame_width: config.tracking.frame_width,
            engine: Engine::Tracking(ColorTracker::new(config.tracking.clone(), config.policy.clone())),
        }
    }

    pub fn mode(&self) -> Mode {
        match self.engine {
            Engine::Motion(_) => Mode::Motion,
            Engine::Tracking(_) => Mode::Tracking,
        }
    }

    /// The frame resized to the width the report's coordinates refer to.
    pub fn canonical(&self, frame: &Frame) -> Frame {
        frame.resize_to_width(self.frame_width)
    }

    pub fn generate_report(&mut self, frame: &Frame) -> Result<Report> {
        match &mut self.engine {
            Engine::Motion(detector) => {
                let result = detector.ingest(frame)?;
                log::debug!("motion: {:?}, {} regions", result.label, result.regions.len());
                Ok(Report::Motion(result))
            }
            Engine::Tracking(tracker) => {
                let result = tracker.track(frame)?;
                if let Some(object) = result.object.filter(|_| result.command != Command::None) {
                    let (x, y) = object.pixel_center();
                    log::info!("({}, {}) {:.2}", x, y, object.radius);
                }
                Ok(Report::Tracking(result))
            }
        }
    }

    pub fn motion_detected(&mut self, frame: &Frame) -> Result<bool> {
        Ok(self.generate_report(frame)?.is_motion())
    }

    /// Starts a new motion session; no effect in tracking mode.
    pub fn reset(&mut self) {
        if let Engine::Motion(detector) = &mut self.engine {
            detector.reset();
        }
    }
}
