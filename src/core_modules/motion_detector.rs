// THEORY:
// The `MotionDetector` answers one question per frame: has anything in the scene
// changed, compared to how the scene looked when the session started?
//
// Key architectural principles:
// 1.  **Explicit session state**: the detector is a two-state machine,
//     `Uninitialized -> Ready(baseline)`. The first observed frame becomes the
//     baseline and is reported as `Normal`, because there is nothing yet to
//     compare against. The baseline is never refreshed automatically; lighting
//     drift over a long session requires an explicit `reset()`.
// 2.  **Noise-robust differencing**: frames are resized, collapsed to greyscale
//     and blurred before the absolute difference is taken. The difference is
//     binarised with a fixed cutoff and dilated so that fragments of one moving
//     object merge into one region.
// 3.  **Area as the noise gate**: regions whose contour area is below the
//     configured minimum are discarded. That is noise rejection, not a
//     detection failure.
// 4.  **Determinism**: given a baseline and a frame, the result is fully
//     reproducible. There is no randomness and no hidden global state, so any
//     number of independent detectors can run side by side.

use crate::config::MotionConfig;
use crate::core_modules::contour::BoundingBox;
use crate::core_modules::contour_detector::contour_detector;
use crate::core_modules::frame::Frame;
use crate::core_modules::mask;
use crate::core_modules::preprocessor::Preprocessor;
use crate::error::Result;

/// Status line emitted for a frame without qualifying motion.
pub const STATUS_NORMAL: &str = "Normal";
/// Status line emitted for a frame with at least one qualifying region.
pub const STATUS_MOTION: &str = "Moving Object detected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionLabel {
    Normal,
    MotionDetected,
}

impl MotionLabel {
    pub fn status_line(self) -> &'static str {
        match self {
            MotionLabel::Normal => STATUS_NORMAL,
            MotionLabel::MotionDetected => STATUS_MOTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub label: MotionLabel,
    /// Bounding boxes of every qualifying region, in the canonical frame's coordinates.
    pub regions: Vec<BoundingBox>,
}

impl DetectionResult {
    pub fn normal() -> Self {
        Self {
            label: MotionLabel::Normal,
            regions: Vec::new(),
        }
    }

    pub fn is_motion(&self) -> bool {
        self.label == MotionLabel::MotionDetected
    }
}

/// Session state of a detector.
#[derive(Debug, Clone)]
pub enum BaselineState {
    /// No frame observed yet.
    Uninitialized,
    /// The smoothed greyscale frame every later frame is compared against.
    Ready(Frame),
}

pub struct MotionDetector {
    config: MotionConfig,
    preprocessor: Preprocessor,
    state: BaselineState,
}

impl MotionDetector {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            preprocessor: Preprocessor::new(config.frame_width, config.blur_kernel),
            config,
            state: BaselineState::Uninitialized,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn state(&self) -> &BaselineState {
        &self.state
    }

    pub fn has_baseline(&self) -> bool {
        matches!(self.state, BaselineState::Ready(_))
    }

    /// Forgets the baseline; the next frame starts a new session.
    pub fn reset(&mut self) {
        log::info!("motion baseline reset");
        self.state = BaselineState::Uninitialized;
    }

    /// Classifies one frame against the session baseline.
    pub fn ingest(&mut self, frame: &Frame) -> Result<DetectionResult> {
        let processed = self.preprocessor.prepare_gray(frame)?;

        let baseline = match &self.state {
            BaselineState::Uninitialized => {
                log::debug!(
                    "motion baseline initialised at {}x{}",
                    processed.width(),
                    processed.height()
                );
                self.state = BaselineState::Ready(processed);
                return Ok(DetectionResult::normal());
            }
            BaselineState::Ready(baseline) => baseline,
        };

        let difference = mask::abs_diff(baseline, &processed)?;
        let binary = mask::threshold(&difference, self.config.diff_threshold)?;
        let dilated = mask::dilate(&binary, self.config.dilate_iterations)?;

        let contours = contour_detector::find_external_contours(&dilated)?;
        let candidates = contours.len();
        let regions: Vec<BoundingBox> = contour_detector::filter_by_area(contours, self.config.min_area)
            .into_iter()
            .map(|c| c.bounding_box)
            .collect();

        log::debug!("motion: {} candidate regions, {} above min area", candidates, regions.len());

        if regions.is_empty() {
            Ok(DetectionResult::normal())
        } else {
            Ok(DetectionResult {
                label: MotionLabel::MotionDetected,
                regions,
            })
        }
    }
}
