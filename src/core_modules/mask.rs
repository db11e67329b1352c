// THEORY:
// A mask is a single-channel binary `Frame`: every sample is either 0
// (background) or 255 (foreground). Masks are produced in exactly two ways,
// thresholding an intensity difference (motion) or testing colour membership
// (tracking), and consumed only by contour extraction.
//
// Between production and consumption masks are cleaned with morphology:
// - `dilate` grows foreground, merging fragments that lighting noise split apart.
// - `erode` shrinks foreground, deleting speckles smaller than the element.
// Both use a 3x3 square element; `n` iterations equal one pass with a
// Chebyshev radius of `n`, which is how they are computed.

use crate::core_modules::frame::{ChannelLayout, Frame};
use crate::core_modules::pixel::pixel::{HUE_MAX, Hsv};
use crate::error::{Result, VisionError};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Inclusive HSV bounds; a pixel is in range when every channel lies within
/// `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl HsvRange {
    pub const fn new(lower: Hsv, upper: Hsv) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&hsv.h)
            && (self.lower.s..=self.upper.s).contains(&hsv.s)
            && (self.lower.v..=self.upper.v).contains(&hsv.v)
    }

    /// Rejects inverted bounds and hues outside the 8-bit hue circle.
    pub fn validate(&self) -> Result<()> {
        let lower = self.lower.to_array();
        let upper = self.upper.to_array();
        if lower.iter().zip(upper.iter()).any(|(l, u)| l > u) {
            return Err(VisionError::Config(format!(
                "HSV lower bound {:?} exceeds upper bound {:?}",
                lower, upper
            )));
        }
        if self.upper.h > HUE_MAX {
            return Err(VisionError::Config(format!(
                "HSV hue bound {} is outside 0..={}",
                self.upper.h, HUE_MAX
            )));
        }
        Ok(())
    }
}

impl Default for HsvRange {
    /// A saturated blue.
    fn default() -> Self {
        Self::new(Hsv::new(100, 100, 100), Hsv::new(120, 255, 255))
    }
}

fn expect_gray<'a>(frame: &'a Frame, stage: &str) -> Result<&'a GrayImage> {
    frame.as_gray_image().ok_or_else(|| {
        VisionError::UnsupportedLayout(format!("{stage} expects a greyscale frame, got {:?}", frame.layout()))
    })
}

/// Per-pixel absolute difference of two greyscale frames of equal size.
pub fn abs_diff(a: &Frame, b: &Frame) -> Result<Frame> {
    let left = expect_gray(a, "abs_diff")?;
    let right = expect_gray(b, "abs_diff")?;
    if left.dimensions() != right.dimensions() {
        return Err(VisionError::SizeMismatch {
            expected: left.dimensions(),
            actual: right.dimensions(),
        });
    }
    let diff = GrayImage::from_fn(left.width(), left.height(), |x, y| {
        Luma([left.get_pixel(x, y).0[0].abs_diff(right.get_pixel(x, y).0[0])])
    });
    Ok(Frame::from_gray_image(diff))
}

/// Binary threshold: samples `>= cutoff` become foreground.
pub fn threshold(frame: &Frame, cutoff: u8) -> Result<Frame> {
    let gray = expect_gray(frame, "threshold")?;
    let mask = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] >= cutoff {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    });
    Ok(Frame::from_gray_image(mask))
}

/// Foreground where an HSV frame's pixel lies inside `range` on every channel.
pub fn in_range(hsv: &Frame, range: &HsvRange) -> Result<Frame> {
    if hsv.layout() != ChannelLayout::Hsv {
        return Err(VisionError::UnsupportedLayout(format!(
            "in_range expects an HSV frame, got {:?}",
            hsv.layout()
        )));
    }
    let mask = GrayImage::from_fn(hsv.width(), hsv.height(), |x, y| {
        let inside = hsv
            .get(x, y)
            .is_some_and(|s| range.contains(Hsv::new(s[0], s[1], s[2])));
        Luma([if inside { FOREGROUND } else { BACKGROUND }])
    });
    Ok(Frame::from_gray_image(mask))
}

pub fn dilate(mask: &Frame, iterations: u8) -> Result<Frame> {
    let gray = expect_gray(mask, "dilate")?;
    if iterations == 0 {
        return Ok(mask.clone());
    }
    Ok(Frame::from_gray_image(imageproc::morphology::dilate(gray, Norm::LInf, iterations)))
}

pub fn erode(mask: &Frame, iterations: u8) -> Result<Frame> {
    let gray = expect_gray(mask, "erode")?;
    if iterations == 0 {
        return Ok(mask.clone());
    }
    Ok(Frame::from_gray_image(imageproc::morphology::erode(gray, Norm::LInf, iterations)))
}

/// Number of foreground samples.
pub fn count_foreground(mask: &Frame) -> usize {
    mask.data().iter().filter(|&&v| v != BACKGROUND).count()
}
