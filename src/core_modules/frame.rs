// THEORY:
// A `Frame` is the unit of data that flows between pipeline stages: a rectangular
// grid of pixel samples with a known width, height and channel layout.
//
// Key principles:
// 1.  **Immutable steps**: every processing step (resize, colour conversion, blur)
//     returns a new `Frame` instead of mutating in place. Stages stay composable
//     and each intermediate can be inspected in tests.
// 2.  **Layout is data**: the layout (`Rgb`, `Gray`, `Hsv`) travels with the
//     pixels, so a stage that expects greyscale can refuse an RGB frame instead of
//     silently misreading it.
// 3.  **Bounds-checked access**: `get` never panics; out-of-range coordinates are
//     simply `None`.
//
// Storage is delegated to the `image` crate's buffers. HSV frames reuse the
// three-channel buffer type, the layout tag tells them apart.

use crate::core_modules::pixel::pixel::Pixel;
use crate::error::{Result, VisionError};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

/// Channel layout of a frame's samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Red, green, blue; 3 bytes per pixel.
    Rgb,
    /// Single intensity channel. Binary masks use 0 / 255.
    Gray,
    /// 8-bit hue (0..180), saturation, value; 3 bytes per pixel.
    Hsv,
}

impl ChannelLayout {
    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Rgb | ChannelLayout::Hsv => 3,
            ChannelLayout::Gray => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Buffer {
    Color(RgbImage),
    Gray(GrayImage),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    layout: ChannelLayout,
    buffer: Buffer,
}

impl Frame {
    /// Builds a frame from a raw row-major buffer.
    pub fn new(width: u32, height: u32, layout: ChannelLayout, data: Vec<u8>) -> Result<Self> {
        let channels = layout.channels();
        let expected = width as usize * height as usize * channels;
        let actual = data.len();
        let malformed = || VisionError::MalformedFrame {
            width,
            height,
            channels,
            expected,
            actual,
        };
        if width == 0 || height == 0 {
            return Err(malformed());
        }

        let buffer = match layout {
            ChannelLayout::Gray => Buffer::Gray(GrayImage::from_raw(width, height, data).ok_or_else(malformed)?),
            ChannelLayout::Rgb | ChannelLayout::Hsv => {
                Buffer::Color(RgbImage::from_raw(width, height, data).ok_or_else(malformed)?)
            }
        };
        Ok(Self { layout, buffer })
    }

    pub fn from_rgb_image(image: RgbImage) -> Self {
        Self {
            layout: ChannelLayout::Rgb,
            buffer: Buffer::Color(image),
        }
    }

    pub fn from_gray_image(image: GrayImage) -> Self {
        Self {
            layout: ChannelLayout::Gray,
            buffer: Buffer::Gray(image),
        }
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_rgb_image(image.to_rgb8())
    }

    pub fn width(&self) -> u32 {
        match &self.buffer {
            Buffer::Color(image) => image.width(),
            Buffer::Gray(image) => image.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match &self.buffer {
            Buffer::Color(image) => image.height(),
            Buffer::Gray(image) => image.height(),
        }
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// The raw row-major sample buffer.
    pub fn data(&self) -> &[u8] {
        match &self.buffer {
            Buffer::Color(image) => image.as_raw(),
            Buffer::Gray(image) => image.as_raw(),
        }
    }

    /// Bounds-checked access to the samples of one pixel.
    pub fn get(&self, x: u32, y: u32) -> Option<&[u8]> {
        match &self.buffer {
            Buffer::Color(image) => image.get_pixel_checked(x, y).map(|p| &p.0[..]),
            Buffer::Gray(image) => image.get_pixel_checked(x, y).map(|p| &p.0[..]),
        }
    }

    pub fn as_gray_image(&self) -> Option<&GrayImage> {
        match &self.buffer {
            Buffer::Gray(image) => Some(image),
            Buffer::Color(_) => None,
        }
    }

    /// The RGB buffer, only for frames in the `Rgb` layout.
    pub fn as_rgb_image(&self) -> Option<&RgbImage> {
        match (&self.buffer, self.layout) {
            (Buffer::Color(image), ChannelLayout::Rgb) => Some(image),
            _ => None,
        }
    }

    /// A displayable copy: greyscale frames are expanded to RGB. HSV frames are
    /// returned as-is (channels reinterpreted), which is only useful for debugging.
    pub fn to_rgb_image(&self) -> RgbImage {
        match &self.buffer {
            Buffer::Color(image) => image.clone(),
            Buffer::Gray(image) => DynamicImage::ImageLuma8(image.clone()).to_rgb8(),
        }
    }

    /// Fails with `EmptyFrame` when either dimension is zero.
    pub fn ensure_non_empty(&self) -> Result<()> {
        if self.width() == 0 || self.height() == 0 {
            return Err(VisionError::EmptyFrame {
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }

    /// Resizes to `width`, keeping the aspect ratio (height is truncated, never below 1).
    /// An empty frame is returned unchanged.
    pub fn resize_to_width(&self, width: u32) -> Frame {
        let width = width.max(1);
        if width == self.width() || self.width() == 0 || self.height() == 0 {
            return self.clone();
        }
        let height = ((self.height() as u64 * width as u64) / self.width() as u64).max(1) as u32;
        let buffer = match &self.buffer {
            Buffer::Color(image) => Buffer::Color(image::imageops::resize(image, width, height, FilterType::Triangle)),
            Buffer::Gray(image) => Buffer::Gray(image::imageops::resize(image, width, height, FilterType::Triangle)),
        };
        Frame {
            layout: self.layout,
            buffer,
        }
    }

    /// Converts to a single-channel greyscale frame (Rec. 601 luma).
    pub fn to_gray(&self) -> Result<Frame> {
        match (&self.buffer, self.layout) {
            (Buffer::Gray(_), _) => Ok(self.clone()),
            (Buffer::Color(image), ChannelLayout::Rgb) => {
                let gray = GrayImage::from_fn(image.width(), image.height(), |x, y| {
                    let [red, green, blue] = image.get_pixel(x, y).0;
                    Luma([Pixel::new(red, green, blue).gray()])
                });
                Ok(Frame::from_gray_image(gray))
            }
            _ => Err(VisionError::UnsupportedLayout(format!(
                "cannot convert {:?} frame to greyscale",
                self.layout
            ))),
        }
    }

    /// Converts an RGB frame to 8-bit HSV.
    pub fn to_hsv(&self) -> Result<Frame> {
        match (&self.buffer, self.layout) {
            (_, ChannelLayout::Hsv) => Ok(self.clone()),
            (Buffer::Color(image), ChannelLayout::Rgb) => {
                let hsv = RgbImage::from_fn(image.width(), image.height(), |x, y| {
                    let [red, green, blue] = image.get_pixel(x, y).0;
                    Rgb(Pixel::new(red, green, blue).to_hsv().to_array())
                });
                Ok(Frame {
                    layout: ChannelLayout::Hsv,
                    buffer: Buffer::Color(hsv),
                })
            }
            _ => Err(VisionError::UnsupportedLayout(format!(
                "cannot convert {:?} frame to HSV",
                self.layout
            ))),
        }
    }

    /// Gaussian blur for an odd square kernel of size `kernel`, with sigma derived
    /// from the kernel size the way a zero sigma is resolved by common CV tooling.
    pub fn gaussian_blur(&self, kernel: u32) -> Frame {
        let sigma = sigma_for_kernel(kernel);
        if sigma <= 0.0 {
            return self.clone();
        }
        let buffer = match &self.buffer {
            Buffer::Color(image) => Buffer::Color(imageproc::filter::gaussian_blur_f32(image, sigma)),
            Buffer::Gray(image) => Buffer::Gray(imageproc::filter::gaussian_blur_f32(image, sigma)),
        };
        Frame {
            layout: self.layout,
            buffer,
        }
    }
}

/// `sigma = 0.3 * ((k - 1) * 0.5 - 1) + 0.8`; zero for a zero kernel.
pub fn sigma_for_kernel(kernel: u32) -> f32 {
    if kernel == 0 {
        return 0.0;
    }
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}
