// THEORY:
// `FaceCapture` builds a small face dataset for training a recogniser: it takes
// frames, asks a `FaceDetector` where the faces are, and writes every detected
// face as a fixed-size greyscale JPEG into `<dataset>/<name>/`.
//
// The detector itself is a collaborator behind a trait. The bundled camera
// build supplies a Haar-cascade implementation; tests supply a scripted one.
// Detection runs on the greyscale frame and crops are taken from that same
// greyscale frame, so the detector and the dataset see identical pixels.
//
// Files are numbered from 1 in capture order (`1.jpg`, `2.jpg`, ...). Several
// faces in one frame each consume a number, so a frame may overshoot the
// target by a few images; the session is complete once the target is reached.
//
// `detect_faces` and `annotate_faces` serve the live viewer, which only draws
// the detections and never writes a file.

use crate::core_modules::contour::BoundingBox;
use crate::core_modules::frame::Frame;
use crate::core_modules::utils::image_helper::image_helper;
use crate::error::Result;
use image::RgbImage;
use image::imageops::{self, FilterType};
use std::path::{Path, PathBuf};

pub const FACE_WIDTH: u32 = 130;
pub const FACE_HEIGHT: u32 = 100;
pub const DEFAULT_TARGET: u32 = 30;
pub const DEFAULT_SCALE_FACTOR: f64 = 1.3;
pub const DEFAULT_MIN_NEIGHBORS: u32 = 4;

/// Locates faces in a greyscale frame.
pub trait FaceDetector {
    fn detect(&mut self, gray: &Frame, scale_factor: f64, min_neighbors: u32) -> Result<Vec<BoundingBox>>;
}

/// Runs `detector` on the greyscale version of `frame` with the default cascade parameters.
pub fn detect_faces(frame: &Frame, detector: &mut dyn FaceDetector) -> Result<Vec<BoundingBox>> {
    let gray = frame.to_gray()?;
    detector.detect(&gray, DEFAULT_SCALE_FACTOR, DEFAULT_MIN_NEIGHBORS)
}

/// Colour copy of `frame` with a green 2px box around every face.
pub fn annotate_faces(frame: &Frame, faces: &[BoundingBox]) -> RgbImage {
    let mut canvas = frame.to_rgb_image();
    for face in faces {
        image_helper::draw_box(&mut canvas, face, image_helper::GREEN, 2);
    }
    canvas
}

pub struct FaceCapture {
    dir: PathBuf,
    face_width: u32,
    face_height: u32,
    target: u32,
    /// Number of the next file to write.
    count: u32,
    pub scale_factor: f64,
    pub min_neighbors: u32,
}

impl FaceCapture {
    /// Prepares `<dataset>/<name>/`, creating it when missing.
    pub fn new(dataset: &Path, name: &str, target: u32) -> Result<Self> {
        let dir = dataset.join(name);
        std::fs::create_dir_all(&dir)?;
        log::info!("capturing {} face images into {}", target, dir.display());
        Ok(Self {
            dir,
            face_width: FACE_WIDTH,
            face_height: FACE_HEIGHT,
            target,
            count: 1,
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn saved(&self) -> u32 {
        self.count - 1
    }

    pub fn is_complete(&self) -> bool {
        self.saved() >= self.target
    }

    /// Detects faces in `frame` and saves one crop per detection. Returns the
    /// detections so the caller can draw them.
    pub fn capture(&mut self, frame: &Frame, detector: &mut dyn FaceDetector) -> Result<Vec<BoundingBox>> {
        let gray = frame.to_gray()?;
        let faces = detector.detect(&gray, self.scale_factor, self.min_neighbors)?;
        let Some(source) = gray.as_gray_image() else {
            return Ok(faces);
        };

        for face in &faces {
            let x = face.x.min(source.width());
            let y = face.y.min(source.height());
            let width = face.width.min(source.width() - x);
            let height = face.height.min(source.height() - y);
            if width == 0 || height == 0 {
                log::warn!("ignoring face outside the frame: {:?}", face);
                continue;
            }

            let crop = imageops::crop_imm(source, x, y, width, height).to_image();
            let resized = imageops::resize(&crop, self.face_width, self.face_height, FilterType::Triangle);
            let path = self.dir.join(format!("{}.jpg", self.count));
            image_helper::save_jpeg(&path, &Frame::from_gray_image(resized))?;
            log::debug!("saved face {}", path.display());
            self.count += 1;
        }

        Ok(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::ChannelLayout;
    use image::{Rgb, RgbImage};

    struct Scripted(Vec<Vec<BoundingBox>>);

    impl FaceDetector for Scripted {
        fn detect(&mut self, gray: &Frame, scale_factor: f64, min_neighbors: u32) -> Result<Vec<BoundingBox>> {
            assert_eq!(gray.layout(), ChannelLayout::Gray);
            assert_eq!(scale_factor, 1.3);
            assert_eq!(min_neighbors, 4);
            Ok(if self.0.is_empty() { Vec::new() } else { self.0.remove(0) })
        }
    }

    fn frame() -> Frame {
        Frame::from_rgb_image(RgbImage::from_pixel(320, 240, Rgb([90, 120, 150])))
    }

    #[test]
    fn creates_directory_and_numbers_files_from_one() {
        let dataset = tempfile::tempdir().unwrap();
        let mut capture = FaceCapture::new(dataset.path(), "snapd", 3).unwrap();
        assert!(dataset.path().join("snapd").is_dir());

        let mut detector = Scripted(vec![
            vec![BoundingBox::new(10, 10, 80, 80)],
            vec![],
            vec![BoundingBox::new(0, 0, 50, 60), BoundingBox::new(100, 100, 90, 70)],
        ]);
        for _ in 0..3 {
            capture.capture(&frame(), &mut detector).unwrap();
        }

        assert!(capture.is_complete());
        for n in 1..=3 {
            let saved = image::open(capture.dir().join(format!("{n}.jpg"))).unwrap();
            assert_eq!((saved.width(), saved.height()), (FACE_WIDTH, FACE_HEIGHT));
        }
        assert!(!capture.dir().join("4.jpg").exists());
    }

    #[test]
    fn live_detection_draws_without_saving() {
        let dataset = tempfile::tempdir().unwrap();
        let mut detector = Scripted(vec![vec![BoundingBox::new(40, 30, 60, 50)]]);

        let faces = detect_faces(&frame(), &mut detector).unwrap();
        assert_eq!(faces, vec![BoundingBox::new(40, 30, 60, 50)]);

        let canvas = annotate_faces(&frame(), &faces);
        assert_eq!(*canvas.get_pixel(40, 30), image_helper::GREEN);
        assert_eq!(*canvas.get_pixel(41, 31), image_helper::GREEN);
        assert_eq!(*canvas.get_pixel(70, 55), Rgb([90, 120, 150]));
        assert_eq!(std::fs::read_dir(dataset.path()).unwrap().count(), 0);
    }

    #[test]
    fn boxes_are_clipped_to_the_frame() {
        let dataset = tempfile::tempdir().unwrap();
        let mut capture = FaceCapture::new(dataset.path(), "clip", 30).unwrap();
        let mut detector = Scripted(vec![vec![
            BoundingBox::new(300, 200, 100, 100),
            BoundingBox::new(400, 10, 20, 20),
        ]]);
        let faces = capture.capture(&frame(), &mut detector).unwrap();
        assert_eq!(faces.len(), 2);
        assert_eq!(capture.saved(), 1);
        assert!(!capture.is_complete());
    }
}
