//! Quill Ink
//!
//! Stroke capture for freehand drawing:
//!
//! - **Brushes**: immutable width/color/alpha descriptors
//! - **Smoothing**: an incremental quadratic-curve encoder fed one raw point at a time
//! - **Stroke logs**: ordered strokes with an O(1) total point count and a
//!   point-budgeted front split, observable through mutation events
//! - **Transfer accounting**: tracks how many points can be handed to a
//!   background compositor without visual risk
//!
//! # Example
//!
//! ```rust
//! use quill_ink::{Brush, LatestStrokeCollection};
//! use quill_paint::{Color, Point};
//!
//! let mut live = LatestStrokeCollection::new();
//! live.new_stroke(Point::new(0.0, 0.0), Brush::new(4.0, Color::BLACK, 1.0));
//! live.add_point(Point::new(10.0, 10.0));
//! assert_eq!(live.total_point_count(), 4);
//! assert_eq!(live.transferrable_point_count(), 4);
//!
//! let batch = live.split_in_two(live.transferrable_point_count());
//! assert_eq!(batch.total_point_count(), 4);
//! ```

pub mod accounting;
pub mod brush;
pub mod collection;
pub mod error;
pub mod log;
pub mod smoothing;
pub mod stroke;

pub use accounting::TransferAccounting;
pub use brush::Brush;
pub use collection::{LatestStrokeCollection, StrokeCollection};
pub use error::{InkError, Result};
pub use log::{LogEvent, StrokeLog, StrokeObserver, DEFAULT_MIN_POINT_DISTANCE};
pub use smoothing::SmoothingWindow;
pub use stroke::Stroke;
