//! Whole-image rasterization of stroke batches

use std::sync::Arc;

use image::RgbaImage;
use quill_ink::StrokeCollection;
use tracing::debug;

use crate::error::{RasterError, Result};
use crate::size::PixelSize;
use crate::stroker::{draw_strokes, PathRenderer, RoundCapStroker};

/// Produces a full image: an optional base image with strokes drawn on top.
///
/// Called both synchronously (undo) and from compositor worker threads.
pub trait ImageRasterizer: Send + Sync {
    fn rasterize(
        &self,
        size: PixelSize,
        base: Option<&RgbaImage>,
        strokes: &StrokeCollection,
    ) -> Result<RgbaImage>;
}

/// CPU rasterizer drawing through a shared [`PathRenderer`]
#[derive(Clone)]
pub struct SoftwareRasterizer {
    renderer: Arc<dyn PathRenderer>,
}

impl SoftwareRasterizer {
    pub fn new(renderer: Arc<dyn PathRenderer>) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &Arc<dyn PathRenderer> {
        &self.renderer
    }
}

impl Default for SoftwareRasterizer {
    fn default() -> Self {
        Self::new(Arc::new(RoundCapStroker))
    }
}

impl std::fmt::Debug for SoftwareRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareRasterizer").finish_non_exhaustive()
    }
}

impl ImageRasterizer for SoftwareRasterizer {
    fn rasterize(
        &self,
        size: PixelSize,
        base: Option<&RgbaImage>,
        strokes: &StrokeCollection,
    ) -> Result<RgbaImage> {
        size.validate()?;

        let mut image = match base {
            Some(base) if PixelSize::of(base) != size => {
                return Err(RasterError::SizeMismatch {
                    width: size.width,
                    height: size.height,
                    actual_width: base.width(),
                    actual_height: base.height(),
                });
            }
            Some(base) => base.clone(),
            None => size.blank_image()?,
        };

        draw_strokes(self.renderer.as_ref(), &mut image, strokes);

        debug!(
            width = size.width,
            height = size.height,
            strokes = strokes.stroke_count(),
            points = strokes.total_point_count(),
            "rasterized stroke batch"
        );
        Ok(image)
    }
}
