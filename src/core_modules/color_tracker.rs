// THEORY:
// The `ColorTracker` follows a single object of a known colour and measures it.
//
// Per frame:
// 1.  Resize to the canonical width and blur (tuned for colour rather than
//     intensity comparison).
// 2.  Convert to HSV, where an object's colour is far more stable under changing
//     illumination than in RGB.
// 3.  Mask every pixel inside the configured range (inclusive, all channels).
// 4.  Clean the mask with an opening: erode first to delete speckles without
//     inflating them, then dilate to restore the shape of genuine regions.
// 5.  Extract external contours and keep the one with the largest area. This is
//     a deliberate single-object assumption; several same-coloured objects are
//     not disambiguated.
// 6.  Measure it: moment-based centroid and minimal enclosing circle. A
//     degenerate contour (zero area) produces no result at all.
// 7.  Objects whose enclosing radius does not exceed the minimum are reported
//     but not acted on; otherwise the `DirectionPolicy` decides the command.
//
// The HSV range is read-only configuration supplied by the caller; the tracker
// keeps no state between frames.

use crate::config::{PolicyConfig, TrackingConfig};
use crate::core_modules::contour::Circle;
use crate::core_modules::contour_detector::contour_detector;
use crate::core_modules::direction_policy::{self, Command};
use crate::core_modules::frame::Frame;
use crate::core_modules::mask::{self, HsvRange};
use crate::core_modules::preprocessor::Preprocessor;
use crate::error::Result;

/// Measurements of the tracked object, in canonical-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedObject {
    /// Moment-based centroid.
    pub center: (f64, f64),
    /// Radius of the minimal enclosing circle.
    pub radius: f64,
    /// Centre of the minimal enclosing circle.
    pub circle_center: (f64, f64),
    pub area: f64,
}

impl TrackedObject {
    /// Centroid rounded down to whole pixels, as printed on the status stream.
    pub fn pixel_center(&self) -> (i64, i64) {
        (self.center.0.floor() as i64, self.center.1.floor() as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingResult {
    pub object: Option<TrackedObject>,
    pub command: Command,
    /// Width of the frame the measurements refer to.
    pub frame_width: u32,
}

impl TrackingResult {
    fn empty(frame_width: u32) -> Self {
        Self {
            object: None,
            command: Command::None,
            frame_width,
        }
    }

    pub fn center(&self) -> Option<(f64, f64)> {
        self.object.map(|o| o.center)
    }

    pub fn radius(&self) -> Option<f64> {
        self.object.map(|o| o.radius)
    }
}

pub struct ColorTracker {
    config: TrackingConfig,
    policy: PolicyConfig,
    preprocessor: Preprocessor,
}

impl ColorTracker {
    pub fn new(config: TrackingConfig, policy: PolicyConfig) -> Self {
        Self {
            preprocessor: Preprocessor::new(config.frame_width, config.blur_kernel),
            config,
            policy,
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Tracks using the range from the tracker's configuration.
    pub fn track(&self, frame: &Frame) -> Result<TrackingResult> {
        self.ingest(frame, &self.config.range)
    }

    /// Tracks the largest region of `range`-coloured pixels in `frame`.
    pub fn ingest(&self, frame: &Frame, range: &HsvRange) -> Result<TrackingResult> {
        let blurred = self.preprocessor.prepare(frame)?;
        let frame_width = blurred.width();
        let hsv = blurred.to_hsv()?;

        let in_range = mask::in_range(&hsv, range)?;
        let eroded = mask::erode(&in_range, self.config.erode_iterations)?;
        let cleaned = mask::dilate(&eroded, self.config.dilate_iterations)?;

        let contours = contour_detector::find_external_contours(&cleaned)?;
        let Some(largest) = contour_detector::largest(&contours) else {
            return Ok(TrackingResult::empty(frame_width));
        };
        let Some(center) = largest.centroid() else {
            log::debug!("tracking: largest region is degenerate, skipping");
            return Ok(TrackingResult::empty(frame_width));
        };

        let Circle {
            center: circle_center,
            radius,
        } = largest.enclosing_circle;
        let object = TrackedObject {
            center,
            radius,
            circle_center,
            area: largest.area,
        };

        Ok(TrackingResult {
            object: Some(object),
            command: self.command_for(&object, frame_width),
            frame_width,
        })
    }

    /// Steering decision for a located object. The policy sees the whole-pixel
    /// centroid, the same value the status stream reports.
    fn command_for(&self, object: &TrackedObject, frame_width: u32) -> Command {
        if object.radius > self.config.min_radius {
            direction_policy::decide(object.pixel_center().0 as f64, object.radius, frame_width, &self.policy)
        } else {
            Command::None
        }
    }
}
