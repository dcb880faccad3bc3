//! Ink error types

use thiserror::Error;

/// Errors raised when building ink values from untrusted input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InkError {
    /// Brush width must be positive and alpha must lie in `0.0..=1.0`
    #[error("Invalid brush: width {width} must be > 0 and alpha {alpha} within 0..=1")]
    InvalidBrush { width: f32, alpha: f32 },
}

/// Result type for ink operations
pub type Result<T> = std::result::Result<T, InkError>;
