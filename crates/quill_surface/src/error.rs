//! Surface error types

use std::path::PathBuf;

use quill_ink::InkError;
use quill_raster::RasterError;
use thiserror::Error;

/// Errors raised while loading or validating a [`crate::SurfaceConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for a surface config
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Default brush settings are out of range
    #[error("Invalid brush: {0}")]
    Brush(#[from] InkError),

    /// A value is out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Surface-related errors
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Compositor runtime could not be started
    #[error("Failed to start compositor runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Result type for surface operations
pub type Result<T> = std::result::Result<T, SurfaceError>;
