// THEORY:
// The `ContourDetector` is the engine of the spatial grouping layer. It turns a
// binary mask into a list of `Contour`s, one per outermost foreground region.
//
// Algorithm steps:
// 1.  **Border following**: the mask is traced with Suzuki-Abe border following,
//     which yields every outer border and every hole border together with the
//     nesting hierarchy.
// 2.  **External selection**: only outer borders whose parent is the image
//     itself are kept. Regions nested inside holes of other regions belong to
//     the enclosing object and are not reported separately.
// 3.  **Data aggregation**: each selected boundary becomes a `Contour`, which
//     computes its area, bounding box, moments and enclosing circle once.
// 4.  **Stateless utility**: like the rest of the spatial layer, detection has
//     no memory of previous frames.

use crate::core_modules::contour::Contour;
use crate::core_modules::frame::Frame;

pub mod contour_detector {
    use super::*;
    use crate::error::{Result, VisionError};
    use imageproc::contours::{BorderType, find_contours};

    /// Extracts the external contours of every foreground region of `mask`,
    /// in tracing order (top-to-bottom, left-to-right by first boundary pixel).
    pub fn find_external_contours(mask: &Frame) -> Result<Vec<Contour>> {
        let gray = mask.as_gray_image().ok_or_else(|| {
            VisionError::UnsupportedLayout(format!(
                "contour extraction expects a greyscale mask, got {:?}",
                mask.layout()
            ))
        })?;

        let contours = find_contours::<i32>(gray)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .filter_map(|c| Contour::new(c.points))
            .collect();

        Ok(contours)
    }

    /// Keeps the contours whose area reaches `min_area`.
    pub fn filter_by_area(contours: Vec<Contour>, min_area: f64) -> Vec<Contour> {
        contours.into_iter().filter(|c| c.area >= min_area).collect()
    }

    /// The contour of maximum area; the first one wins on ties.
    pub fn largest(contours: &[Contour]) -> Option<&Contour> {
        contours.iter().fold(None, |best: Option<&Contour>, c| match best {
            Some(b) if b.area >= c.area => Some(b),
            _ => Some(c),
        })
    }
}
