//! Ordered stroke storage with observable mutations
//!
//! [`StrokeLog`] owns the strokes and a cached total point count. Every
//! mutation is reported to a [`StrokeObserver`] so derived counters (see
//! [`crate::accounting::TransferAccounting`]) can be kept up to date
//! without subclassing the storage.

use quill_paint::Point;
use tracing::{debug, trace};

use crate::brush::Brush;
use crate::stroke::Stroke;

/// Points closer than this to the previous point of a stroke are dropped
pub const DEFAULT_MIN_POINT_DISTANCE: f32 = 1.5;

/// A mutation that has just been applied to a [`StrokeLog`]
#[derive(Clone, Copy, Debug)]
pub enum LogEvent<'a> {
    /// A stroke was appended. `previous` is the stroke that was last before it.
    StrokeStarted {
        previous: Option<&'a Stroke>,
        started: &'a Stroke,
    },
    /// A point was appended to the last stroke
    PointAppended { stroke: &'a Stroke },
    /// The last stroke was popped. `new_last` is the stroke now at the end.
    StrokeRemoved {
        removed: &'a Stroke,
        new_last: Option<&'a Stroke>,
    },
    /// Every stroke was removed
    Cleared,
    /// A batch was split off the front; `remaining` is what the log still holds
    BatchSplit { remaining: &'a [Stroke] },
}

/// Receives every mutation of a [`StrokeLog`], after it has been applied
pub trait StrokeObserver {
    fn observe(&mut self, event: LogEvent<'_>);
}

impl StrokeObserver for () {
    fn observe(&mut self, _event: LogEvent<'_>) {}
}

/// Ordered, append-mostly log of strokes.
///
/// Invariant: `total_point_count() == Σ stroke.len()`, maintained
/// incrementally on every mutation.
#[derive(Clone, Debug)]
pub struct StrokeLog<O = ()> {
    strokes: Vec<Stroke>,
    total_point_count: usize,
    min_point_distance: f32,
    observer: O,
}

impl<O: StrokeObserver + Default> StrokeLog<O> {
    pub fn new() -> Self {
        Self::with_observer(O::default())
    }
}

impl<O: StrokeObserver + Default> Default for StrokeLog<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: StrokeObserver> StrokeLog<O> {
    pub fn with_observer(observer: O) -> Self {
        Self {
            strokes: Vec::new(),
            total_point_count: 0,
            min_point_distance: DEFAULT_MIN_POINT_DISTANCE,
            observer,
        }
    }

    /// Set the anti-jitter distance used by [`StrokeLog::add_point`]
    pub fn with_min_point_distance(mut self, distance: f32) -> Self {
        self.min_point_distance = distance;
        self
    }

    pub fn min_point_distance(&self) -> f32 {
        self.min_point_distance
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stroke> {
        self.strokes.iter()
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn total_point_count(&self) -> usize {
        self.total_point_count
    }

    pub fn last_stroke(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.strokes.last().and_then(Stroke::last_point)
    }

    pub fn last_brush(&self) -> Option<&Brush> {
        self.strokes.last().map(Stroke::brush)
    }

    /// Start a new stroke seeded with three copies of `point`
    pub fn new_stroke(&mut self, point: Point, brush: Brush) {
        self.strokes.push(Stroke::new(point, brush));
        self.total_point_count += Stroke::SEED_POINTS;

        if let Some((started, earlier)) = self.strokes.split_last() {
            self.observer.observe(LogEvent::StrokeStarted {
                previous: earlier.last(),
                started,
            });
        }
    }

    /// Append `point` to the last stroke.
    ///
    /// Returns `false` without changing anything when the log is empty or
    /// the point is within the anti-jitter distance of the last point.
    pub fn add_point(&mut self, point: Point) -> bool {
        let Some(stroke) = self.strokes.last_mut() else {
            return false;
        };

        if let Some(previous) = stroke.last_point() {
            if previous.distance(point) <= self.min_point_distance {
                trace!(?point, ?previous, "point dropped by jitter gate");
                return false;
            }
        }

        stroke.push(point);
        self.total_point_count += 1;
        self.observer
            .observe(LogEvent::PointAppended { stroke: &*stroke });
        true
    }

    /// Pop the last stroke, if any
    pub fn remove_last_stroke(&mut self) -> Option<Stroke> {
        let removed = self.strokes.pop()?;
        self.total_point_count -= removed.len();
        self.observer.observe(LogEvent::StrokeRemoved {
            removed: &removed,
            new_last: self.strokes.last(),
        });
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.total_point_count = 0;
        self.observer.observe(LogEvent::Cleared);
    }

    /// Remove up to `num_points` points from the front of the log, in
    /// stroke order, and return them as a new collection.
    ///
    /// Whole strokes are moved while they fit strictly inside the budget.
    /// The stroke where the budget runs out is split: its first
    /// `points_left` points are copied into a new stroke in the result.
    /// The split point stays in both halves (so the two rendered segments
    /// overlap) unless the split falls exactly on the stroke's end while
    /// more strokes follow it; in that case the emptied stroke is left in
    /// place.
    pub fn split_in_two(&mut self, num_points: usize) -> StrokeLog<()> {
        let mut batch = StrokeLog::<()>::new().with_min_point_distance(self.min_point_distance);
        if self.total_point_count == 0 {
            return batch;
        }

        let mut points_left = num_points.min(self.total_point_count);

        let mut whole = 0;
        let mut whole_points = 0;
        for stroke in &self.strokes {
            if stroke.len() >= points_left {
                break;
            }
            points_left -= stroke.len();
            whole_points += stroke.len();
            whole += 1;
        }
        batch.strokes.extend(self.strokes.drain(..whole));
        batch.total_point_count += whole_points;
        self.total_point_count -= whole_points;

        if points_left > 0 {
            let only_stroke_left = self.strokes.len() == 1;
            if let Some(stroke) = self.strokes.first_mut() {
                let duplicate_seam = only_stroke_left || points_left < stroke.len();
                let drop = points_left - usize::from(duplicate_seam);

                batch.strokes.push(stroke.split_front(points_left, drop));
                batch.total_point_count += points_left;
                self.total_point_count -= drop;
            }
        }

        debug!(
            moved = batch.total_point_count,
            strokes = batch.strokes.len(),
            remaining = self.total_point_count,
            "split batch off stroke log"
        );

        self.observer.observe(LogEvent::BatchSplit {
            remaining: &self.strokes,
        });
        batch
    }
}

impl StrokeLog<()> {
    /// Move every stroke of `other` to the end of this collection
    pub fn append(&mut self, mut other: StrokeLog<()>) {
        self.total_point_count += other.total_point_count;
        self.strokes.append(&mut other.strokes);
    }
}

impl<'a, O> IntoIterator for &'a StrokeLog<O> {
    type Item = &'a Stroke;
    type IntoIter = std::slice::Iter<'a, Stroke>;

    fn into_iter(self) -> Self::IntoIter {
        self.strokes.iter()
    }
}
