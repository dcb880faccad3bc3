//! The two stroke collections used by a drawing surface

use crate::accounting::TransferAccounting;
use crate::log::StrokeLog;

/// Ordered strokes with an O(1) total point count
pub type StrokeCollection = StrokeLog<()>;

/// Strokes that have not been composited yet, with transferrable point accounting
pub type LatestStrokeCollection = StrokeLog<TransferAccounting>;
