//! Quill Surface
//!
//! A drawing surface that keeps per-frame rendering cost bounded no matter
//! how long the drawing gets. Finished and opaque ink is handed in batches
//! to a background [`Compositor`] which flattens it onto a cached image;
//! results are reconciled by request id so stale or superseded work is
//! never shown.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use quill_paint::Point;
//! use quill_raster::{DamageRegion, PixelSize};
//! use quill_surface::{Surface, SurfaceConfig};
//!
//! let config = SurfaceConfig {
//!     transfer_threshold: 8,
//!     ..SurfaceConfig::default()
//! };
//! let mut surface = Surface::new(PixelSize::new(64, 64), config, DamageRegion::default())?;
//!
//! surface.pointer_down(Point::new(4.0, 4.0));
//! for i in 1..12 {
//!     surface.pointer_move(Point::new(4.0 + 4.0 * i as f32, 4.0));
//! }
//! surface.pointer_up(Point::new(60.0, 4.0));
//!
//! assert!(surface.wait_for_compositor(Duration::from_secs(5)));
//! assert!(surface.cached_image().is_some());
//! # Ok::<(), quill_surface::SurfaceError>(())
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod surface;

pub use compositor::{CompositeJob, CompositeResult, Compositor, RequestId};
pub use config::{BrushConfig, CompositorConfig, SurfaceConfig};
pub use error::{ConfigError, Result, SurfaceError};
pub use surface::{Surface, SurfaceStats};
