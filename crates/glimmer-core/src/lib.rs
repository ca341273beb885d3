//! Glimmer Core - Foundational types for the Glimmer particle engine
//!
//! This crate provides the types that all other Glimmer crates depend on:
//! - `Vec2` - Surface-space coordinates
//! - `Color` - RGBA colors with `#RRGGBB` parsing
//! - `Viewport` - Pixel dimensions of the hosting view
//! - Error types and Result alias

mod error;
mod types;

pub use error::{GlimmerError, Result};
pub use types::{Color, Vec2, Viewport};
