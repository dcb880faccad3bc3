//! Brush style descriptor

use quill_paint::Color;

use crate::error::{InkError, Result};

/// Immutable stroke style: width, color and alpha.
///
/// A brush is carried by every stroke and compared by value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    width: f32,
    color: Color,
    alpha: f32,
}

impl Brush {
    /// Smallest width `Brush::new` will produce
    pub const MIN_WIDTH: f32 = 0.1;

    /// Create a brush, clamping width to [`Brush::MIN_WIDTH`] and alpha to `0.0..=1.0`
    pub fn new(width: f32, color: Color, alpha: f32) -> Self {
        let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        Self {
            width: width.max(Self::MIN_WIDTH),
            color,
            alpha,
        }
    }

    /// Create a brush, rejecting a non-positive width or an alpha outside `0.0..=1.0`
    pub fn try_new(width: f32, color: Color, alpha: f32) -> Result<Self> {
        if width.is_nan() || width <= 0.0 || !(0.0..=1.0).contains(&alpha) {
            return Err(InkError::InvalidBrush { width, alpha });
        }
        Ok(Self {
            width,
            color,
            alpha,
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Fully opaque brushes never let later overdraw of the same stroke show through
    pub fn is_opaque(&self) -> bool {
        self.alpha >= 1.0
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            width: 4.0,
            color: Color::RED,
            alpha: 1.0,
        }
    }
}
