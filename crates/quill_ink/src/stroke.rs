//! A single pointer-down-to-pointer-up gesture

use quill_paint::Point;

use crate::brush::Brush;
use crate::smoothing::SmoothingWindow;

/// One continuous input gesture: raw points, a fixed brush, and the
/// smoothed points derived from them.
///
/// Every raw point is fed through a [`SmoothingWindow`] as it arrives, so
/// [`Stroke::smoothed`] is a plain accessor. The raw sequence is kept in
/// full since collections count raw points.
#[derive(Clone, Debug)]
pub struct Stroke {
    points: Vec<Point>,
    brush: Brush,
    window: SmoothingWindow,
    smoothed: Vec<Point>,
}

impl Stroke {
    /// Points a new stroke is seeded with, so a single tap already fills a smoothing window
    pub const SEED_POINTS: usize = 3;

    /// Create a stroke seeded with [`Stroke::SEED_POINTS`] copies of `point`
    pub fn new(point: Point, brush: Brush) -> Self {
        Self::from_points(brush, [point; Self::SEED_POINTS])
    }

    /// Build a stroke from existing raw points (no seeding)
    pub fn from_points(brush: Brush, points: impl IntoIterator<Item = Point>) -> Self {
        let mut stroke = Self {
            points: Vec::new(),
            brush,
            window: SmoothingWindow::for_brush(&brush),
            smoothed: Vec::new(),
        };
        for point in points {
            stroke.push(point);
        }
        stroke
    }

    /// Append a raw point unconditionally
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
        let produced = self.window.push(point);
        self.smoothed.extend_from_slice(&produced);
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_point(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Smoothed points emitted so far, or the raw points while fewer than
    /// three have been seen.
    pub fn smoothed(&self) -> &[Point] {
        if self.smoothed.is_empty() {
            &self.points
        } else {
            &self.smoothed
        }
    }

    /// Polyline to hand to a path renderer.
    ///
    /// The smoothed curve lags half a segment behind the input at both
    /// ends, so the first and last raw points are added when they differ
    /// from the curve ends. This lets a live stroke reach the pointer and
    /// lets the two halves of a split stroke meet at their shared seam point.
    pub fn path(&self) -> Vec<Point> {
        if self.smoothed.is_empty() {
            return self.points.clone();
        }

        let mut path = Vec::with_capacity(self.smoothed.len() + 2);
        if let Some(first) = self.first_point() {
            if self.smoothed.first() != Some(&first) {
                path.push(first);
            }
        }
        path.extend_from_slice(&self.smoothed);
        if let Some(last) = self.last_point() {
            if path.last() != Some(&last) {
                path.push(last);
            }
        }
        path
    }

    /// Copy the first `head` raw points into a new stroke with the same
    /// brush and remove the first `drop` raw points from this one.
    ///
    /// The remaining points are re-smoothed from scratch.
    pub(crate) fn split_front(&mut self, head: usize, drop: usize) -> Stroke {
        let head = head.min(self.points.len());
        let front = Stroke::from_points(self.brush, self.points[..head].iter().copied());

        let drop = drop.min(self.points.len());
        if drop > 0 {
            let rest = self.points.split_off(drop);
            *self = Stroke::from_points(self.brush, rest);
        }
        front
    }
}

/// Strokes are equal when they carry the same brush and raw points
impl PartialEq for Stroke {
    fn eq(&self, other: &Self) -> bool {
        self.brush == other.brush && self.points == other.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_paint::Color;

    fn black_brush() -> Brush {
        Brush::new(2.0, Color::BLACK, 1.0)
    }

    fn approx_eq(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_new_stroke_is_seeded() {
        let stroke = Stroke::new(Point::new(3.0, 4.0), black_brush());
        assert_eq!(stroke.len(), Stroke::SEED_POINTS);
        assert!(stroke.points().iter().all(|&p| p == Point::new(3.0, 4.0)));
        // A tap already yields a smoothed dot
        assert_eq!(stroke.smoothed().len(), 4);
    }

    #[test]
    fn test_smoothed_points() {
        let mut stroke = Stroke::new(Point::ZERO, black_brush());
        stroke.push(Point::new(10.0, 10.0));
        stroke.push(Point::new(0.0, 20.0));

        let expected = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(5.0 / 9.0, 5.0 / 9.0),
            Point::new(20.0 / 9.0, 20.0 / 9.0),
            Point::new(5.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(65.0 / 9.0, 75.0 / 9.0),
            Point::new(65.0 / 9.0, 105.0 / 9.0),
            Point::new(5.0, 15.0),
        ];

        let smoothed = stroke.smoothed();
        assert_eq!(smoothed.len(), expected.len());
        for (i, (&actual, &wanted)) in smoothed.iter().zip(expected.iter()).enumerate() {
            assert!(
                approx_eq(actual, wanted),
                "point {i}: got {actual:?}, expected {wanted:?}"
            );
        }
    }

    #[test]
    fn test_smoothing_is_reproducible() {
        let raw = [
            Point::new(1.25, 7.5),
            Point::new(13.0, 2.0),
            Point::new(40.5, 19.75),
            Point::new(22.0, 61.0),
        ];

        let mut incremental = Stroke::new(Point::new(0.5, 0.5), black_brush());
        for p in raw {
            incremental.push(p);
        }
        let rebuilt = Stroke::from_points(*incremental.brush(), incremental.points().to_vec());

        assert_eq!(incremental.smoothed(), rebuilt.smoothed());
    }

    #[test]
    fn test_short_stroke_smooths_to_raw_points() {
        let stroke = Stroke::from_points(black_brush(), [Point::new(1.0, 1.0), Point::new(4.0, 5.0)]);
        assert_eq!(stroke.smoothed(), stroke.points());
        assert_eq!(stroke.path(), stroke.points().to_vec());
    }

    #[test]
    fn test_path_reaches_last_raw_point() {
        let mut stroke = Stroke::new(Point::ZERO, black_brush());
        stroke.push(Point::new(10.0, 10.0));
        stroke.push(Point::new(0.0, 20.0));

        let path = stroke.path();
        assert_eq!(path.first(), Some(&Point::ZERO));
        assert_eq!(path.last(), Some(&Point::new(0.0, 20.0)));
        assert_eq!(path.len(), stroke.smoothed().len() + 1);
    }

    #[test]
    fn test_split_front_duplicates_seam() {
        let mut stroke = Stroke::new(Point::ZERO, black_brush());
        stroke.push(Point::new(10.0, 0.0));
        stroke.push(Point::new(20.0, 0.0));

        let front = stroke.split_front(4, 3);
        assert_eq!(front.len(), 4);
        assert_eq!(stroke.len(), 2);
        assert_eq!(front.last_point(), stroke.first_point());
        assert_eq!(front.brush(), stroke.brush());
    }

    #[test]
    fn test_equality_ignores_derived_state() {
        let a = Stroke::new(Point::new(5.0, 5.0), black_brush());
        let b = Stroke::from_points(black_brush(), [Point::new(5.0, 5.0); 3]);
        assert_eq!(a, b);
    }
}
