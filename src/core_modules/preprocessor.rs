// THEORY:
// The `Preprocessor` normalises raw frames before analysis. It performs the two
// steps every pipeline shares:
// 1.  **Canonical width**: frames are resized (aspect ratio preserved) so the
//     cost of every later step is independent of the source resolution, and so
//     pixel-valued thresholds (areas, radii, bounds) keep a stable meaning.
// 2.  **Smoothing**: a Gaussian blur suppresses sensor noise that would
//     otherwise register as false motion or speckle the colour mask.
//
// The motion pipeline additionally collapses to greyscale before blurring; the
// colour pipeline blurs in RGB and converts afterwards.

use crate::core_modules::frame::Frame;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessor {
    pub frame_width: u32,
    pub blur_kernel: u32,
}

impl Preprocessor {
    pub fn new(frame_width: u32, blur_kernel: u32) -> Self {
        Self {
            frame_width,
            blur_kernel,
        }
    }

    /// Resize then blur, keeping the channel layout.
    pub fn prepare(&self, frame: &Frame) -> Result<Frame> {
        frame.ensure_non_empty()?;
        Ok(frame.resize_to_width(self.frame_width).gaussian_blur(self.blur_kernel))
    }

    /// Resize, collapse to greyscale, then blur.
    pub fn prepare_gray(&self, frame: &Frame) -> Result<Frame> {
        frame.ensure_non_empty()?;
        Ok(frame
            .resize_to_width(self.frame_width)
            .to_gray()?
            .gaussian_blur(self.blur_kernel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::ChannelLayout;
    use crate::error::VisionError;
    use image::{Rgb, RgbImage};

    #[test]
    fn prepare_gray_resizes_and_collapses_channels() {
        let frame = Frame::from_rgb_image(RgbImage::from_pixel(1000, 500, Rgb([10, 200, 30])));
        let prepared = Preprocessor::new(500, 21).prepare_gray(&frame).unwrap();
        assert_eq!((prepared.width(), prepared.height()), (500, 250));
        assert_eq!(prepared.layout(), ChannelLayout::Gray);
    }

    #[test]
    fn prepare_keeps_layout() {
        let frame = Frame::from_rgb_image(RgbImage::from_pixel(450, 300, Rgb([0, 0, 255])));
        let prepared = Preprocessor::new(900, 11).prepare(&frame).unwrap();
        assert_eq!((prepared.width(), prepared.height()), (900, 600));
        assert_eq!(prepared.layout(), ChannelLayout::Rgb);
        let sample = prepared.get(450, 300).unwrap();
        assert!(sample[0] <= 1 && sample[1] <= 1 && sample[2] >= 254);
    }

    #[test]
    fn empty_frames_are_rejected() {
        let preprocessor = Preprocessor::new(500, 21);
        for (width, height) in [(0, 0), (0, 10), (10, 0)] {
            let frame = Frame::from_rgb_image(RgbImage::new(width, height));
            let err = preprocessor.prepare_gray(&frame).unwrap_err();
            assert!(matches!(err, VisionError::EmptyFrame { .. }), "{width}x{height}");
            assert!(matches!(preprocessor.prepare(&frame), Err(VisionError::EmptyFrame { .. })));
        }
    }
}
