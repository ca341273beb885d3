//! Drawing surface abstraction and a recording implementation

use glimmer_core::{Color, GlimmerError, Result, Vec2, Viewport};

/// One filled, glowing circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleDraw {
    pub center: Vec2,
    pub radius: f64,
    pub color: Color,
    /// Opacity in [0, 1], applied on top of `color.a`
    pub alpha: f32,
    /// Blur radius of the glow halo in pixels; 0 disables the halo
    pub glow: f32,
}

/// A full-viewport 2D drawing target
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Resize the pixel buffer. Contents after a resize are unspecified.
    fn set_size(&mut self, width: u32, height: u32);

    /// Clear every pixel to transparent
    fn clear(&mut self);

    fn fill_circle(&mut self, circle: &CircleDraw);
}

/// Attach point that creates the surface when an instance mounts
pub trait SurfaceFactory {
    type Surface: Surface;

    fn create(&mut self, viewport: Viewport) -> Result<Self::Surface>;
}

/// A recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Resize { width: u32, height: u32 },
    Clear,
    Circle(CircleDraw),
}

/// Surface that records every call instead of drawing
#[derive(Debug, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of clears so far, one per painted frame
    pub fn clear_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Clear)).count()
    }

    /// Circles drawn since the most recent clear
    pub fn last_frame(&self) -> Vec<CircleDraw> {
        let start = self
            .ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::Clear))
            .map(|i| i + 1)
            .unwrap_or(0);
        self.ops[start..]
            .iter()
            .filter_map(|op| match op {
                DrawOp::Circle(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.ops.push(DrawOp::Resize { width, height });
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_circle(&mut self, circle: &CircleDraw) {
        self.ops.push(DrawOp::Circle(*circle));
    }
}

/// Creates [`RecordingSurface`]s, or fails every time when unavailable
#[derive(Debug, Default)]
pub struct RecordingFactory {
    unavailable: bool,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose surfaces can never be created
    pub fn unavailable() -> Self {
        Self { unavailable: true }
    }
}

impl SurfaceFactory for RecordingFactory {
    type Surface = RecordingSurface;

    fn create(&mut self, viewport: Viewport) -> Result<RecordingSurface> {
        if self.unavailable {
            return Err(GlimmerError::SurfaceUnavailable(
                "recording surface disabled".into(),
            ));
        }
        Ok(RecordingSurface::new(viewport.width, viewport.height))
    }
}
