//! Transferrable point accounting
//!
//! A point is *transferrable* once future semi-transparent overdraw of its
//! own stroke can no longer change how it looks: it belongs to a finished
//! stroke, or to the current (last) stroke drawn with an opaque brush.
//! Transferrable points may be rasterized in the background.

use crate::log::{LogEvent, StrokeLog, StrokeObserver};
use crate::stroke::Stroke;

/// Maintains the transferrable point count of a [`StrokeLog`] from its
/// mutation events.
///
/// Invariant: the count equals [`TransferAccounting::recompute`] over the
/// observed log's strokes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferAccounting {
    transferrable_point_count: usize,
}

impl TransferAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transferrable_point_count(&self) -> usize {
        self.transferrable_point_count
    }

    /// Every point of every stroke but the last, plus the last stroke's
    /// points when its brush is opaque.
    pub fn recompute(strokes: &[Stroke]) -> usize {
        match strokes.split_last() {
            None => 0,
            Some((last, earlier)) => {
                let finished: usize = earlier.iter().map(Stroke::len).sum();
                finished + transferrable_while_last(last)
            }
        }
    }
}

fn transferrable_while_last(stroke: &Stroke) -> usize {
    if stroke.brush().is_opaque() {
        stroke.len()
    } else {
        0
    }
}

impl StrokeObserver for TransferAccounting {
    fn observe(&mut self, event: LogEvent<'_>) {
        match event {
            LogEvent::StrokeStarted { previous, started } => {
                // The previous stroke is no longer last, so all of its
                // points count now; opaque ones were already counted.
                if let Some(previous) = previous {
                    self.transferrable_point_count += previous.len() - transferrable_while_last(previous);
                }
                self.transferrable_point_count += transferrable_while_last(started);
            }
            LogEvent::PointAppended { stroke } => {
                if stroke.brush().is_opaque() {
                    self.transferrable_point_count += 1;
                }
            }
            LogEvent::StrokeRemoved { removed, new_last } => {
                self.transferrable_point_count -= transferrable_while_last(removed);
                // The new last stroke was fully counted while it was not last
                if let Some(new_last) = new_last {
                    self.transferrable_point_count -= new_last.len() - transferrable_while_last(new_last);
                }
            }
            LogEvent::Cleared => self.transferrable_point_count = 0,
            LogEvent::BatchSplit { remaining } => {
                self.transferrable_point_count = Self::recompute(remaining);
            }
        }
    }
}

impl StrokeLog<TransferAccounting> {
    /// Points that can be handed off to background compositing
    pub fn transferrable_point_count(&self) -> usize {
        self.observer().transferrable_point_count()
    }
}
