pub mod image_helper {
    use crate::core_modules::contour::BoundingBox;
    use crate::core_modules::frame::{ChannelLayout, Frame};
    use crate::error::Result;
    use image::codecs::jpeg::JpegEncoder;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
    use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_hollow_rect_mut};
    use imageproc::rect::Rect;
    use std::fs::File;
    use std::io::BufWriter;
    use std::path::Path;

    pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
    pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
    pub const RED: Rgb<u8> = Rgb([255, 0, 0]);

    pub const JPEG_QUALITY: u8 = 95;

    fn color_type(frame: &Frame) -> ExtendedColorType {
        match frame.layout() {
            ChannelLayout::Gray => ExtendedColorType::L8,
            ChannelLayout::Rgb | ChannelLayout::Hsv => ExtendedColorType::Rgb8,
        }
    }

    pub fn save_png(path: &Path, frame: &Frame) -> Result<()> {
        let output = BufWriter::new(File::create(path)?);
        let encoder = PngEncoder::new(output);

        encoder.write_image(frame.data(), frame.width(), frame.height(), color_type(frame))?;

        Ok(())
    }

    pub fn save_jpeg(path: &Path, frame: &Frame) -> Result<()> {
        let output = BufWriter::new(File::create(path)?);
        let encoder = JpegEncoder::new_with_quality(output, JPEG_QUALITY);

        encoder.write_image(frame.data(), frame.width(), frame.height(), color_type(frame))?;

        Ok(())
    }

    /// Outlines `region` with a rectangle `thickness` pixels wide, growing inwards.
    pub fn draw_box(canvas: &mut RgbImage, region: &BoundingBox, color: Rgb<u8>, thickness: u32) {
        for inset in 0..thickness {
            let width = region.width.saturating_sub(2 * inset);
            let height = region.height.saturating_sub(2 * inset);
            if width == 0 || height == 0 {
                break;
            }
            let rect = Rect::at((region.x + inset) as i32, (region.y + inset) as i32).of_size(width, height);
            draw_hollow_rect_mut(canvas, rect, color);
        }
    }

    /// Ring of `thickness` pixels around `center`, growing inwards.
    pub fn draw_ring(canvas: &mut RgbImage, center: (f64, f64), radius: f64, color: Rgb<u8>, thickness: u32) {
        let center = (center.0.round() as i32, center.1.round() as i32);
        let radius = radius.round() as i32;
        for inset in 0..thickness as i32 {
            if radius - inset <= 0 {
                break;
            }
            draw_hollow_circle_mut(canvas, center, radius - inset, color);
        }
    }

    pub fn draw_dot(canvas: &mut RgbImage, center: (f64, f64), radius: i32, color: Rgb<u8>) {
        draw_filled_circle_mut(canvas, (center.0.round() as i32, center.1.round() as i32), radius, color);
    }
}
