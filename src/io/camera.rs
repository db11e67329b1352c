// THEORY:
// OpenCV-backed collaborators, compiled only with the `camera` feature:
// - `CameraSource` wraps a `VideoCapture` on a device index or a video file.
// - `WindowDisplay` shows annotated frames in a HighGUI window and polls keys.
// - `CascadeFaceDetector` runs a Haar cascade for the face dataset capture.
//
// OpenCV hands out BGR matrices; everything crossing into the engine is
// converted to RGB `Frame`s, and back to BGR on the way out.

use crate::core_modules::contour::BoundingBox;
use crate::core_modules::face_capture::FaceDetector;
use crate::core_modules::frame::{ChannelLayout, Frame};
use crate::error::{Result, VisionError};
use crate::pipeline::Report;
use crate::runner::{Display, FrameSource};
use image::RgbImage;
use opencv::{
    core::{self, Mat, Scalar, Size, Vector},
    highgui, imgproc,
    objdetect::CascadeClassifier,
    prelude::*,
    videoio::{self, VideoCapture},
};

const ESCAPE: i32 = 27;

pub struct CameraSource {
    capture: VideoCapture,
    /// Files end; devices only fail.
    is_file: bool,
    bgr: Mat,
}

impl CameraSource {
    pub fn open_device(index: i32) -> Result<Self> {
        let capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        Self::checked(capture, false, &format!("camera {index}"))
    }

    pub fn open_file(path: &str) -> Result<Self> {
        let capture = VideoCapture::from_file(path, videoio::CAP_ANY)?;
        Self::checked(capture, true, path)
    }

    fn checked(capture: VideoCapture, is_file: bool, name: &str) -> Result<Self> {
        if !capture.is_opened()? {
            return Err(VisionError::SourceOpen(format!("could not open {name}")));
        }
        log::info!("opened {name}");
        Ok(Self {
            capture,
            is_file,
            bgr: Mat::default(),
        })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let grabbed = self.capture.read(&mut self.bgr)?;
        if !grabbed || self.bgr.empty() {
            if self.is_file {
                return Ok(None);
            }
            return Err(VisionError::FrameRead("camera returned no frame".into()));
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color(&self.bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        Frame::new(width, height, ChannelLayout::Rgb, rgb.data_bytes()?.to_vec()).map(Some)
    }

    fn release(&mut self) {
        if let Err(err) = self.capture.release() {
            log::warn!("camera release failed: {}", err);
        }
    }
}

fn rgb_to_bgr_mat(image: &RgbImage) -> Result<Mat> {
    let mut rgb = Mat::new_rows_cols_with_default(
        image.height() as i32,
        image.width() as i32,
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(image.as_raw());
    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

fn gray_mat(frame: &Frame) -> Result<Mat> {
    let gray = frame.to_gray()?;
    let mut mat = Mat::new_rows_cols_with_default(
        gray.height() as i32,
        gray.width() as i32,
        core::CV_8UC1,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(gray.data());
    Ok(mat)
}

/// A HighGUI window. Escape is reported as `'\u{1b}'`.
#[derive(Default)]
pub struct WindowDisplay;

impl WindowDisplay {
    pub fn new() -> Self {
        Self
    }

    /// Shows an already annotated image.
    pub fn show_image(&mut self, window: &str, image: &RgbImage) -> Result<()> {
        highgui::imshow(window, &rgb_to_bgr_mat(image)?)?;
        Ok(())
    }
}

impl Display for WindowDisplay {
    fn show(&mut self, window: &str, frame: &Frame, report: &Report) -> Result<()> {
        self.show_image(window, &report.annotate(frame))
    }

    fn wait_key(&mut self, timeout_ms: u32) -> Option<char> {
        match highgui::wait_key(timeout_ms.max(1) as i32) {
            Ok(key) if key >= 0 => {
                let key = key & 0xFF;
                if key == ESCAPE {
                    Some('\u{1b}')
                } else {
                    char::from_u32(key as u32)
                }
            }
            Ok(_) => None,
            Err(err) => {
                log::warn!("key poll failed: {}", err);
                None
            }
        }
    }
}

impl Drop for WindowDisplay {
    fn drop(&mut self) {
        if let Err(err) = highgui::destroy_all_windows() {
            log::warn!("closing windows failed: {}", err);
        }
    }
}

pub struct CascadeFaceDetector {
    classifier: CascadeClassifier,
}

impl CascadeFaceDetector {
    pub fn load(path: &str) -> Result<Self> {
        let classifier = CascadeClassifier::new(path)?;
        if classifier.empty()? {
            return Err(VisionError::SourceOpen(format!("could not load cascade {path}")));
        }
        Ok(Self { classifier })
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&mut self, gray: &Frame, scale_factor: f64, min_neighbors: u32) -> Result<Vec<BoundingBox>> {
        let mat = gray_mat(gray)?;
        let mut faces = Vector::<core::Rect>::new();
        self.classifier.detect_multi_scale(
            &mat,
            &mut faces,
            scale_factor,
            min_neighbors as i32,
            0,
            Size::new(0, 0),
            Size::new(0, 0),
        )?;
        Ok(faces
            .iter()
            .map(|r| BoundingBox::new(r.x.max(0) as u32, r.y.max(0) as u32, r.width.max(0) as u32, r.height.max(0) as u32))
            .collect())
    }
}
