//! Incremental stroke smoothing
//!
//! Raw pointer samples are turned into a quadratic-curve approximation one
//! point at a time. Each new raw point closes a window of three consecutive
//! samples `(p0, p1, p2)`; the window emits points along the quadratic
//! Bézier from `mid(p0, p1)` to `mid(p1, p2)` with `p1` as control point,
//! followed by `mid(p1, p2)` itself, which anchors the next window.
//!
//! The smoothed output is for rendering only, never for hit-testing.

use quill_paint::Point;
use smallvec::SmallVec;

use crate::brush::Brush;

/// Brushes wider than this use fewer curve samples per window
pub const THICK_BRUSH_WIDTH: f32 = 16.0;

/// Number of curve samples per window for a brush width.
///
/// Curvature is less perceptible on thick strokes, so they get 2 samples
/// instead of 3.
pub fn segments_for_width(width: f32) -> u8 {
    if width > THICK_BRUSH_WIDTH {
        2
    } else {
        3
    }
}

/// Incremental smoothing encoder.
///
/// Holds only the last two raw points plus a count of emitted points, so a
/// stroke can be smoothed as it grows without revisiting earlier input.
#[derive(Clone, Debug)]
pub struct SmoothingWindow {
    history: SmallVec<[Point; 2]>,
    segments: u8,
    emitted: usize,
}

impl SmoothingWindow {
    /// Create a window emitting `segments` curve samples (plus the anchor) per raw point
    pub fn new(segments: u8) -> Self {
        Self {
            history: SmallVec::new(),
            segments: segments.max(1),
            emitted: 0,
        }
    }

    pub fn for_brush(brush: &Brush) -> Self {
        Self::new(segments_for_width(brush.width()))
    }

    /// Feed one raw point.
    ///
    /// Returns nothing until three points have been seen, then
    /// `segments + 1` points per call.
    pub fn push(&mut self, point: Point) -> SmallVec<[Point; 4]> {
        let mut out = SmallVec::new();

        if let &[p0, p1] = self.history.as_slice() {
            let m1 = p0.midpoint(p1);
            let m2 = p1.midpoint(point);
            let k = self.segments as f32;
            for step in 0..self.segments {
                let t = step as f32 / k;
                out.push(quadratic(m1, p1, m2, t));
            }
            out.push(m2);
            self.history.remove(0);
        }
        self.history.push(point);

        self.emitted += out.len();
        out
    }

    /// Total number of smoothed points produced so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Raw points retained for the next window (at most 2)
    pub fn pending(&self) -> &[Point] {
        &self.history
    }

    pub fn segments(&self) -> u8 {
        self.segments
    }
}

/// `B(t) = start·(1−t)² + 2·control·t·(1−t) + end·t²`
fn quadratic(start: Point, control: Point, end: Point, t: f32) -> Point {
    let u = 1.0 - t;
    start * (u * u) + control * (2.0 * t * u) + end * (t * t)
}
