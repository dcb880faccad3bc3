//! Dirty-region reporting
//!
//! The drawing surface never repaints by itself. It tells an
//! [`InvalidationHost`] which parts of the view changed, and the host
//! schedules a repaint. [`DamageRegion`] is a host that just accumulates
//! the damage until the next frame takes it.

use quill_paint::Rect;

/// Receives invalidation requests from a drawing surface
pub trait InvalidationHost {
    /// A rectangle of the view, in view pixels, needs repainting
    fn invalidate(&mut self, rect: Rect);

    /// The whole view needs repainting
    fn invalidate_all(&mut self);
}

/// Accumulated damage since the last frame
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// Nothing changed
    #[default]
    None,
    /// Only these rectangles changed
    Rects(Vec<Rect>),
    /// Everything must be redrawn
    Full,
}

impl DamageRegion {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match other {
            Self::None => {}
            Self::Full => *self = Self::Full,
            Self::Rects(b) => match self {
                Self::Full => {}
                Self::None => *self = Self::Rects(b.clone()),
                Self::Rects(a) => a.extend_from_slice(b),
            },
        }
    }

    /// Smallest rectangle covering every damaged rect, `None` unless rect-based
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rects(rects) => rects.iter().copied().reduce(|a, b| a.union(&b)),
            Self::None | Self::Full => None,
        }
    }

    /// Take the accumulated damage, leaving `None` behind
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl InvalidationHost for DamageRegion {
    fn invalidate(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        match self {
            Self::Full => {}
            Self::None => *self = Self::Rects(vec![rect]),
            Self::Rects(rects) => rects.push(rect),
        }
    }

    fn invalidate_all(&mut self) {
        *self = Self::Full;
    }
}
