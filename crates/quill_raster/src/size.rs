//! Pixel dimensions of a drawing surface

use image::RgbaImage;
use quill_paint::Rect;

use crate::error::{RasterError, Result};

/// Width and height in whole pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    /// Largest buffer the rasterizers will allocate (256 Mpx)
    pub const MAX_PIXELS: u64 = 1 << 28;

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// The whole surface as a rectangle at the origin
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    /// Check that a buffer of this size can be allocated
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(RasterError::EmptySize {
                width: self.width,
                height: self.height,
            });
        }
        if self.area() > Self::MAX_PIXELS {
            return Err(RasterError::BufferTooLarge {
                width: self.width,
                height: self.height,
                max: Self::MAX_PIXELS,
            });
        }
        Ok(())
    }

    /// Allocate a fully transparent image of this size
    pub fn blank_image(&self) -> Result<RgbaImage> {
        self.validate()?;
        Ok(RgbaImage::new(self.width, self.height))
    }

    pub fn of(image: &RgbaImage) -> Self {
        Self::new(image.width(), image.height())
    }
}

impl From<(u32, u32)> for PixelSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}
