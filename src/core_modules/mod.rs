pub mod calibration;
pub mod color_tracker;
pub mod contour;
pub mod contour_detector;
pub mod direction_policy;
pub mod face_capture;
pub mod frame;
pub mod mask;
pub mod motion_detector;
pub mod pixel;
pub mod preprocessor;

pub mod utils {
    pub mod image_helper;
}
