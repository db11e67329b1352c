// THEORY:
// The `Contour` module is the spatial summary layer. A `Contour` is the ordered
// boundary of one connected foreground region in a mask, together with the
// derived metrics both pipelines need:
// - `area`: polygon area of the boundary (noise rejection, "largest object").
// - `bounding_box`: axis-aligned, inclusive pixel box (motion report).
// - `moments` and `centroid`: moment-based centre of mass (tracking).
// - `enclosing_circle`: minimal circle containing every boundary point (tracking).
//
// Key architectural principles:
// 1.  **Computed once**: metrics are derived eagerly in `Contour::new` and cached;
//     a contour is a read-only snapshot of one region in one frame.
// 2.  **Degeneracy is explicit**: a contour whose polygon has zero area (a single
//     pixel, a one-pixel-wide line) has no defined centroid. `centroid()` returns
//     `None` and callers skip it, no division by zero ever happens.
// 3.  **Stateless data container**: like the other snapshots in this engine, a
//     contour knows nothing about previous frames.
//
// Points are `imageproc` points straight from contour tracing; hull and area come
// from `imageproc::geometry`. Only the first-order moments and the enclosing
// circle are computed here.

use imageproc::geometry::{contour_area, convex_hull};

/// A boundary point in pixel coordinates.
pub type Point = imageproc::point::Point<i32>;

/// Inclusive, axis-aligned pixel box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// One past the last column.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the last row.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }
}

/// Spatial moments of the boundary polygon.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Green's theorem over the closed polygon. Orientation is normalised so
    /// `m00` is never negative.
    pub fn of_polygon(points: &[Point]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }
        let mut m00 = 0.0;
        let mut m10 = 0.0;
        let mut m01 = 0.0;
        for (i, current) in points.iter().enumerate() {
            let next = points[(i + 1) % points.len()];
            let (xi, yi) = (current.x as f64, current.y as f64);
            let (xj, yj) = (next.x as f64, next.y as f64);
            let cross = xi * yj - xj * yi;
            m00 += cross;
            m10 += cross * (xi + xj);
            m01 += cross * (yi + yj);
        }
        let sign = if m00 < 0.0 { -1.0 } else { 1.0 };
        Self {
            m00: sign * m00 / 2.0,
            m10: sign * m10 / 6.0,
            m01: sign * m01 / 6.0,
        }
    }

    /// `(m10 / m00, m01 / m00)`, undefined for a zero-area polygon.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00.abs() < f64::EPSILON {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    pub center: (f64, f64),
    pub radius: f64,
}

impl Circle {
    fn from_point(p: (f64, f64)) -> Self {
        Self { center: p, radius: 0.0 }
    }

    fn from_diameter(a: (f64, f64), b: (f64, f64)) -> Self {
        let center = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
        Self {
            center,
            radius: distance(center, a).max(distance(center, b)),
        }
    }

    /// Circumcircle of three points, or `None` when they are collinear.
    fn circumscribing(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<Self> {
        let (bx, by) = (b.0 - a.0, b.1 - a.1);
        let (cx, cy) = (c.0 - a.0, c.1 - a.1);
        let d = 2.0 * (bx * cy - by * cx);
        if d.abs() < 1e-12 {
            return None;
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        let center = (a.0 + ux, a.1 + uy);
        let radius = distance(center, a).max(distance(center, b)).max(distance(center, c));
        Some(Self { center, radius })
    }

    pub fn contains(&self, p: (f64, f64)) -> bool {
        distance(self.center, p) <= self.radius + 1e-7 * self.radius.max(1.0)
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Smallest circle containing every point. Runs the incremental construction on
/// the convex hull, which is small for the blob-like regions seen here.
pub fn min_enclosing_circle(points: &[Point]) -> Circle {
    let hull = if points.len() < 3 { points.to_vec() } else { convex_hull(points) };
    let hull: Vec<(f64, f64)> = hull
        .into_iter()
        .map(|p| (p.x as f64, p.y as f64))
        .collect();
    let Some(&first) = hull.first() else {
        return Circle::default();
    };

    let mut circle = Circle::from_point(first);
    for i in 1..hull.len() {
        if circle.contains(hull[i]) {
            continue;
        }
        circle = Circle::from_point(hull[i]);
        for j in 0..i {
            if circle.contains(hull[j]) {
                continue;
            }
            circle = Circle::from_diameter(hull[i], hull[j]);
            for k in 0..j {
                if circle.contains(hull[k]) {
                    continue;
                }
                circle = Circle::circumscribing(hull[i], hull[j], hull[k]).unwrap_or_else(|| {
                    // Collinear: the widest pair spans the other point.
                    [
                        Circle::from_diameter(hull[i], hull[j]),
                        Circle::from_diameter(hull[i], hull[k]),
                        Circle::from_diameter(hull[j], hull[k]),
                    ]
                    .into_iter()
                    .fold(Circle::default(), |best, c| if c.radius > best.radius { c } else { best })
                });
            }
        }
    }
    circle
}

/// A single region boundary with its cached metrics.
#[derive(Debug, Clone)]
pub struct Contour {
    /// Boundary pixel centres in tracing order.
    pub points: Vec<Point>,
    pub area: f64,
    pub bounding_box: BoundingBox,
    pub moments: Moments,
    pub enclosing_circle: Circle,
}

impl Contour {
    /// Builds a contour and derives its metrics. Returns `None` for an empty point list.
    pub fn new(points: Vec<Point>) -> Option<Self> {
        let first = *points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let bounding_box = BoundingBox::new(
            min_x.max(0) as u32,
            min_y.max(0) as u32,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        );
        let moments = Moments::of_polygon(&points);
        let enclosing_circle = min_enclosing_circle(&points);

        Some(Self {
            area: contour_area(&points).abs(),
            bounding_box,
            moments,
            enclosing_circle,
            points,
        })
    }

    pub fn centroid(&self) -> Option<(f64, f64)> {
        self.moments.centroid()
    }

    pub fn is_degenerate(&self) -> bool {
        self.centroid().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle_outline(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point> {
        let mut points = Vec::new();
        for x in x0..=x1 {
            points.push(Point::new(x, y0));
        }
        for y in (y0 + 1)..=y1 {
            points.push(Point::new(x1, y));
        }
        for x in (x0..x1).rev() {
            points.push(Point::new(x, y1));
        }
        for y in ((y0 + 1)..y1).rev() {
            points.push(Point::new(x0, y));
        }
        points
    }

    #[test]
    fn rectangle_metrics() {
        let contour = Contour::new(rectangle_outline(10, 20, 19, 29)).unwrap();
        assert_eq!(contour.bounding_box, BoundingBox::new(10, 20, 10, 10));
        // Pixel-centre polygon of a 10x10 block spans 9x9.
        assert!((contour.area - 81.0).abs() < 1e-9);
        let (cx, cy) = contour.centroid().unwrap();
        assert!((cx - 14.5).abs() < 1e-9);
        assert!((cy - 24.5).abs() < 1e-9);
    }

    #[test]
    fn orientation_does_not_change_area_sign() {
        let mut points = rectangle_outline(0, 0, 4, 4);
        let forward = Moments::of_polygon(&points);
        points.reverse();
        let backward = Moments::of_polygon(&points);
        assert!(forward.m00 > 0.0);
        assert!((forward.m00 - backward.m00).abs() < 1e-9);
        assert_eq!(forward.centroid(), backward.centroid());
    }

    #[test]
    fn degenerate_contours_have_no_centroid() {
        let single = Contour::new(vec![Point::new(3, 3)]).unwrap();
        assert!(single.is_degenerate());
        assert_eq!(single.area, 0.0);

        let line = Contour::new(vec![Point::new(0, 0), Point::new(5, 0), Point::new(10, 0)]).unwrap();
        assert!(line.is_degenerate());
        assert_eq!(line.bounding_box, BoundingBox::new(0, 0, 11, 1));
    }

    #[test]
    fn empty_contour_is_rejected() {
        assert!(Contour::new(Vec::new()).is_none());
    }

    #[test]
    fn enclosing_circle_of_square_corners() {
        let points = vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10), Point::new(0, 10)];
        let circle = min_enclosing_circle(&points);
        assert!((circle.center.0 - 5.0).abs() < 1e-9);
        assert!((circle.center.1 - 5.0).abs() < 1e-9);
        assert!((circle.radius - 50f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn enclosing_circle_covers_every_point() {
        let points: Vec<Point> = (0..40)
            .map(|i| {
                let angle = i as f64 * 0.7;
                Point::new((angle.cos() * 30.0) as i32 + 50, (angle.sin() * 17.0) as i32 + 40)
            })
            .collect();
        let circle = min_enclosing_circle(&points);
        for p in &points {
            assert!(circle.contains((p.x as f64, p.y as f64)), "{p:?} outside {circle:?}");
        }
        assert!(circle.radius <= 31.0);
    }

    #[test]
    fn collinear_points_use_the_widest_pair() {
        let points = vec![Point::new(0, 0), Point::new(4, 0), Point::new(10, 0)];
        let circle = min_enclosing_circle(&points);
        assert!((circle.radius - 5.0).abs() < 1e-9);
        assert!((circle.center.0 - 5.0).abs() < 1e-9);
    }

    #[test]
    fn interior_points_do_not_move_the_circle() {
        let outline = rectangle_outline(0, 0, 6, 6);
        let mut with_interior = outline.clone();
        with_interior.extend([Point::new(3, 3), Point::new(2, 4), Point::new(5, 1)]);
        assert_eq!(min_enclosing_circle(&outline), min_enclosing_circle(&with_interior));
    }

    #[test]
    fn area_matches_first_order_moments() {
        let contour = Contour::new(rectangle_outline(3, 4, 17, 12)).unwrap();
        assert!((contour.area - contour.moments.m00).abs() < 1e-9);
        assert!((contour.area - 14.0 * 8.0).abs() < 1e-9);
    }

    #[test]
    fn bounding_box_overlap() {
        let a = BoundingBox::new(0, 0, 10, 10);
        assert!(a.overlaps(&BoundingBox::new(9, 9, 5, 5)));
        assert!(!a.overlaps(&BoundingBox::new(10, 0, 5, 5)));
        assert_eq!(a.area(), 100);
    }
}
