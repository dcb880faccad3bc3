//! Quill Raster
//!
//! CPU rendering collaborators for a drawing surface:
//!
//! - [`PathRenderer`] strokes a polyline with a brush into an RGBA buffer;
//!   [`RoundCapStroker`] is the anti-aliased reference implementation
//! - [`ImageRasterizer`] produces a full image from a base image plus a
//!   stroke batch; [`SoftwareRasterizer`] does it with any `PathRenderer`
//! - [`InvalidationHost`] receives dirty regions; [`DamageRegion`]
//!   accumulates them for a host that repaints on its own schedule

pub mod error;
pub mod invalidation;
pub mod rasterizer;
pub mod size;
pub mod stroker;

pub use error::{RasterError, Result};
pub use invalidation::{DamageRegion, InvalidationHost};
pub use rasterizer::{ImageRasterizer, SoftwareRasterizer};
pub use size::PixelSize;
pub use stroker::{draw_strokes, PathRenderer, RoundCapStroker};

/// Pixel buffer type used throughout Quill
pub use image::RgbaImage;
