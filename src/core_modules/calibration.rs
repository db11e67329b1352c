// THEORY:
// Calibration turns "the colour of that thing" into an `HsvRange` the tracker
// can use. The operator points at one pixel of the object; its hue becomes the
// centre of a hue window, while saturation and value are opened wide
// (`100..=255`) so shading and highlights on the object still match.
//
// Hue bounds are clamped onto the 8-bit hue circle rather than wrapped, so a
// red sample near 0 yields a narrower window instead of a split one.

use crate::core_modules::frame::{ChannelLayout, Frame};
use crate::core_modules::mask::HsvRange;
use crate::core_modules::pixel::pixel::{HUE_MAX, Hsv, Pixel};

/// Half-width of the sampled hue window.
pub const DEFAULT_HUE_WINDOW: u8 = 10;
pub const SATURATION_FLOOR: u8 = 100;
pub const VALUE_FLOOR: u8 = 100;

/// HSV of the pixel at `(x, y)`, whatever the frame's colour layout.
pub fn sample_hsv(frame: &Frame, (x, y): (u32, u32)) -> Option<Hsv> {
    let samples = frame.get(x, y)?;
    match frame.layout() {
        ChannelLayout::Hsv => Some(Hsv::new(samples[0], samples[1], samples[2])),
        ChannelLayout::Rgb => Some(Pixel::from(samples).to_hsv()),
        ChannelLayout::Gray => Some(Pixel::new(samples[0], samples[0], samples[0]).to_hsv()),
    }
}

/// Range centred on the hue at `point`; `None` when the point lies outside the frame.
pub fn sample_hsv_bounds(frame: &Frame, point: (u32, u32), hue_window: u8) -> Option<HsvRange> {
    let hsv = sample_hsv(frame, point)?;
    Some(range_around_hue(hsv.h, hue_window))
}

pub fn range_around_hue(hue: u8, hue_window: u8) -> HsvRange {
    let hue = hue.min(HUE_MAX);
    let lower = hue.saturating_sub(hue_window);
    let upper = hue.saturating_add(hue_window).min(HUE_MAX);
    HsvRange::new(
        Hsv::new(lower, SATURATION_FLOOR, VALUE_FLOOR),
        Hsv::new(upper, u8::MAX, u8::MAX),
    )
}

/// `[h s v]`, the bracketed form the calibration report prints.
pub fn format_hsv(hsv: Hsv) -> String {
    format!("[{} {} {}]", hsv.h, hsv.s, hsv.v)
}

/// A `[tracking]` table ready to paste into a configuration file.
pub fn toml_snippet(range: &HsvRange) -> String {
    let [lh, ls, lv] = range.lower.to_array();
    let [uh, us, uv] = range.upper.to_array();
    format!("[tracking]\nlower = [{lh}, {ls}, {lv}]\nupper = [{uh}, {us}, {uv}]\n")
}
