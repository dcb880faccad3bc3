//! Quill Paint primitives
//!
//! Leaf value types shared by every Quill crate.
//!
//! # Features
//!
//! - `Point`: 2D position with the distance/midpoint helpers stroke capture needs
//! - `Color`: RGBA color with `f32` components
//! - `Rect`: axis-aligned rectangle used for dirty-region invalidation

pub mod color;
pub mod point;
pub mod rect;

pub use color::Color;
pub use point::Point;
pub use rect::Rect;
