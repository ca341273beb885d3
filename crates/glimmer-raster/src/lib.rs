//! Glimmer Raster - CPU drawing surface
//!
//! `Canvas` implements the particle `Surface` on an RGBA image buffer, with
//! antialiased circles, a gaussian glow halo and source-over blending. Frames
//! can be flattened onto a background color and saved as PNG.

mod canvas;

pub use canvas::{Canvas, CanvasFactory};
