//! Raster error types

use thiserror::Error;

/// Errors that can occur while producing a raster image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// Target has no pixels
    #[error("Cannot rasterize into an empty {width}x{height} image")]
    EmptySize { width: u32, height: u32 },

    /// Target would exceed the pixel limit
    #[error("Image of {width}x{height} exceeds the {max} pixel limit")]
    BufferTooLarge { width: u32, height: u32, max: u64 },

    /// Base image does not match the requested size
    #[error("Base image is {actual_width}x{actual_height}, expected {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Rasterization stopped before producing an image
    #[error("Rasterization was interrupted: {0}")]
    Interrupted(String),
}

/// Result type for raster operations
pub type Result<T> = std::result::Result<T, RasterError>;
