//! Surface configuration (quill.toml)

use std::fs;
use std::path::Path;

use quill_ink::{Brush, DEFAULT_MIN_POINT_DISTANCE};
use quill_paint::Color;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables of a drawing surface
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SurfaceConfig {
    /// Transferrable points that trigger a background composite
    #[serde(default = "default_transfer_threshold")]
    pub transfer_threshold: usize,
    /// Anti-jitter distance: closer pointer samples are dropped
    #[serde(default = "default_min_point_distance")]
    pub min_point_distance: f32,
    /// Dirty rects around new points grow by this many brush widths
    #[serde(default = "default_invalidation_padding")]
    pub invalidation_padding: f32,
    #[serde(default)]
    pub brush: BrushConfig,
    #[serde(default)]
    pub compositor: CompositorConfig,
}

fn default_transfer_threshold() -> usize {
    500
}

fn default_min_point_distance() -> f32 {
    DEFAULT_MIN_POINT_DISTANCE
}

fn default_invalidation_padding() -> f32 {
    0.5
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            transfer_threshold: default_transfer_threshold(),
            min_point_distance: default_min_point_distance(),
            invalidation_padding: default_invalidation_padding(),
            brush: BrushConfig::default(),
            compositor: CompositorConfig::default(),
        }
    }
}

/// Brush used until the host picks another one
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BrushConfig {
    #[serde(default = "default_brush_width")]
    pub width: f32,
    /// `0xRRGGBB` or `0xRRGGBBAA`
    #[serde(default = "default_brush_color")]
    pub color: u32,
    #[serde(default = "default_brush_alpha")]
    pub alpha: f32,
}

fn default_brush_width() -> f32 {
    4.0
}

fn default_brush_color() -> u32 {
    0xFF0000
}

fn default_brush_alpha() -> f32 {
    1.0
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            width: default_brush_width(),
            color: default_brush_color(),
            alpha: default_brush_alpha(),
        }
    }
}

impl BrushConfig {
    pub fn to_brush(&self) -> Result<Brush, ConfigError> {
        Ok(Brush::try_new(
            self.width,
            Color::from_hex(self.color),
            self.alpha,
        )?)
    }
}

/// Background compositor settings
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompositorConfig {
    /// Threads available to rasterization jobs
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    /// Completed results buffered before workers wait on the surface
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_worker_threads() -> usize {
    1
}

fn default_queue_capacity() -> usize {
    8
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl SurfaceConfig {
    /// Parse and validate a TOML config
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SurfaceConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transfer_threshold == 0 {
            return Err(ConfigError::Invalid(
                "transfer_threshold must be at least 1".to_string(),
            ));
        }
        if self.min_point_distance.is_nan() || self.min_point_distance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_point_distance must be >= 0, got {}",
                self.min_point_distance
            )));
        }
        if self.invalidation_padding.is_nan() || self.invalidation_padding < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "invalidation_padding must be >= 0, got {}",
                self.invalidation_padding
            )));
        }
        if self.compositor.worker_threads == 0 {
            return Err(ConfigError::Invalid(
                "compositor.worker_threads must be at least 1".to_string(),
            ));
        }
        if self.compositor.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "compositor.queue_capacity must be at least 1".to_string(),
            ));
        }
        self.brush.to_brush()?;
        Ok(())
    }
}
