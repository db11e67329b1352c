// THEORY:
// `SyntheticSource` is a scripted frame source: a fixed list of frames,
// optionally followed by a read failure, with a counter of `release()` calls.
// It exists so the run loop can be exercised end to end without a camera,
// and the free functions build the canonical test scenes (flat backdrop,
// block, disk) used across the test suite and the CLI demo.

use crate::core_modules::frame::Frame;
use crate::error::{Result, VisionError};
use crate::runner::FrameSource;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use std::collections::VecDeque;

pub struct SyntheticSource {
    frames: VecDeque<Frame>,
    fail_after: Option<usize>,
    delivered: usize,
    releases: u32,
}

impl SyntheticSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            fail_after: None,
            delivered: 0,
            releases: 0,
        }
    }

    /// Makes the read after `count` delivered frames fail.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn releases(&self) -> u32 {
        self.releases
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.fail_after == Some(self.delivered) {
            return Err(VisionError::FrameRead(format!(
                "scripted read failure after {} frames",
                self.delivered
            )));
        }
        let frame = self.frames.pop_front();
        if frame.is_some() {
            self.delivered += 1;
        }
        Ok(frame)
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}

pub fn backdrop(width: u32, height: u32, color: [u8; 3]) -> Frame {
    Frame::from_rgb_image(RgbImage::from_pixel(width, height, Rgb(color)))
}

/// A backdrop with one filled rectangle.
pub fn with_block(base: &Frame, x: i32, y: i32, width: u32, height: u32, color: [u8; 3]) -> Frame {
    let mut image = base.to_rgb_image();
    draw_filled_rect_mut(&mut image, Rect::at(x, y).of_size(width, height), Rgb(color));
    Frame::from_rgb_image(image)
}

/// A backdrop with one filled disk.
pub fn with_disk(base: &Frame, center: (i32, i32), radius: i32, color: [u8; 3]) -> Frame {
    let mut image = base.to_rgb_image();
    draw_filled_circle_mut(&mut image, center, radius, Rgb(color));
    Frame::from_rgb_image(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_then_ends() {
        let base = backdrop(4, 4, [0, 0, 0]);
        let mut source = SyntheticSource::new(vec![base.clone(), base]);
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
        assert_eq!(source.delivered(), 2);
    }

    #[test]
    fn scripted_failure() {
        let base = backdrop(4, 4, [0, 0, 0]);
        let mut source = SyntheticSource::new(vec![base.clone(), base]).failing_after(1);
        assert!(source.next_frame().is_ok());
        assert!(matches!(source.next_frame(), Err(VisionError::FrameRead(_))));
    }

    #[test]
    fn scene_builders_paint_where_asked() {
        let base = backdrop(50, 50, [10, 10, 10]);
        let block = with_block(&base, 5, 5, 10, 10, [200, 0, 0]);
        assert_eq!(block.get(7, 7).unwrap(), &[200, 0, 0]);
        assert_eq!(block.get(30, 30).unwrap(), &[10, 10, 10]);
        let disk = with_disk(&base, (25, 25), 8, [0, 0, 255]);
        assert_eq!(disk.get(25, 25).unwrap(), &[0, 0, 255]);
    }
}
