//! RGBA image surface with glowing circle rasterization

use glimmer_core::{Color, GlimmerError, Result, Viewport};
use glimmer_particles::{CircleDraw, Surface, SurfaceFactory};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Glow halo peak intensity relative to the circle body
const GLOW_STRENGTH: f32 = 0.6;

/// Offscreen drawing surface backed by an `RgbaImage` (straight alpha)
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.image.width() && y < self.image.height() {
            Some(*self.image.get_pixel(x, y))
        } else {
            None
        }
    }

    /// Composite the canvas over an opaque background color
    pub fn flattened(&self, background: Color) -> RgbaImage {
        let bg = [background.r, background.g, background.b];
        let mut out = RgbaImage::new(self.image.width(), self.image.height());
        for (x, y, px) in self.image.enumerate_pixels() {
            let a = px[3] as f32 / 255.0;
            let channel = |i: usize| {
                let c = px[i] as f32 / 255.0 * a + bg[i] * (1.0 - a);
                (c.clamp(0.0, 1.0) * 255.0).round() as u8
            };
            out.put_pixel(x, y, Rgba([channel(0), channel(1), channel(2), 255]));
        }
        out
    }

    /// Save the canvas as PNG, flattened onto `background` if given
    pub fn save_png(&self, path: impl AsRef<Path>, background: Option<Color>) -> Result<()> {
        let path = path.as_ref();
        let result = match background {
            Some(bg) => self.flattened(bg).save(path),
            None => self.image.save(path),
        };
        result.map_err(|e| GlimmerError::ImageError(format!("{}: {e}", path.display())))?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    fn blend(&mut self, x: u32, y: u32, color: Color, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x, y);
        let da = dst[3] as f32 / 255.0;
        let sa = alpha.min(1.0);
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for (i, s) in src.iter().enumerate() {
            let d = dst[i] as f32 / 255.0;
            let c = (s * sa + d * da * (1.0 - sa)) / out_a;
            dst[i] = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        dst[3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
    }

    fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    fn fill_circle(&mut self, circle: &CircleDraw) {
        let opacity = circle.alpha * circle.color.a;
        if !(opacity > 0.0 && circle.radius > 0.0) {
            return;
        }
        let (cx, cy) = (circle.center.x, circle.center.y);
        if !(cx.is_finite() && cy.is_finite() && circle.radius.is_finite()) {
            return;
        }
        let (w, h) = (self.image.width(), self.image.height());
        if w == 0 || h == 0 {
            return;
        }

        let radius = circle.radius as f32;
        let glow = circle.glow.max(0.0);
        let extent = (radius + glow + 1.0) as f64;

        let x0 = (cx - extent).floor().max(0.0);
        let y0 = (cy - extent).floor().max(0.0);
        let x1 = (cx + extent).ceil().min(w as f64 - 1.0);
        let y1 = (cy + extent).ceil().min(h as f64 - 1.0);
        if x0 > x1 || y0 > y1 {
            return;
        }

        // Canvas shadow blur maps to a gaussian with sigma = blur / 2
        let sigma = glow / 2.0;
        for y in y0 as u32..=y1 as u32 {
            for x in x0 as u32..=x1 as u32 {
                let dx = (x as f64 + 0.5 - cx) as f32;
                let dy = (y as f64 + 0.5 - cy) as f32;
                let d = (dx * dx + dy * dy).sqrt();

                let body = (radius + 0.5 - d).clamp(0.0, 1.0);
                let halo = if sigma > 0.0 {
                    let outside = (d - radius).max(0.0);
                    GLOW_STRENGTH * (-(outside * outside) / (2.0 * sigma * sigma)).exp()
                } else {
                    0.0
                };
                let coverage = body.max(halo);
                self.blend(x, y, circle.color, coverage * opacity);
            }
        }
    }
}

/// Creates canvases sized to the viewport
pub struct CanvasFactory {
    max_dimension: u32,
}

impl Default for CanvasFactory {
    fn default() -> Self {
        Self {
            max_dimension: 16_384,
        }
    }
}

impl CanvasFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl SurfaceFactory for CanvasFactory {
    type Surface = Canvas;

    fn create(&mut self, viewport: Viewport) -> Result<Canvas> {
        if viewport.is_empty() {
            return Err(GlimmerError::SurfaceUnavailable(format!(
                "viewport {}x{} has no area",
                viewport.width, viewport.height
            )));
        }
        if viewport.width > self.max_dimension || viewport.height > self.max_dimension {
            return Err(GlimmerError::SurfaceUnavailable(format!(
                "viewport {}x{} exceeds {}px",
                viewport.width, viewport.height, self.max_dimension
            )));
        }
        Ok(Canvas::new(viewport.width, viewport.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_core::Vec2;

    fn circle(x: f64, y: f64, radius: f64, glow: f32) -> CircleDraw {
        CircleDraw {
            center: Vec2::new(x, y),
            radius,
            color: Color::from_hex(0xFF0000),
            alpha: 1.0,
            glow,
        }
    }

    #[test]
    fn new_canvas_is_transparent() {
        let canvas = Canvas::new(4, 3);
        assert_eq!((canvas.width(), canvas.height()), (4, 3));
        assert!(canvas.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn circle_body_is_filled() {
        let mut canvas = Canvas::new(20, 20);
        canvas.fill_circle(&circle(10.0, 10.0, 3.0, 0.0));
        assert_eq!(canvas.pixel(10, 10), Some(Rgba([255, 0, 0, 255])));
        // Outside the radius with no glow stays empty
        assert_eq!(canvas.pixel(0, 0).unwrap()[3], 0);
        assert_eq!(canvas.pixel(16, 10).unwrap()[3], 0);
    }

    #[test]
    fn glow_extends_past_radius() {
        let mut plain = Canvas::new(40, 40);
        plain.fill_circle(&circle(20.0, 20.0, 2.0, 0.0));
        let mut glowing = Canvas::new(40, 40);
        glowing.fill_circle(&circle(20.0, 20.0, 2.0, 8.0));

        assert_eq!(plain.pixel(25, 20).unwrap()[3], 0);
        let halo = glowing.pixel(25, 20).unwrap()[3];
        assert!(halo > 0 && halo < 255, "halo alpha = {halo}");
    }

    #[test]
    fn alpha_scales_coverage() {
        let mut canvas = Canvas::new(10, 10);
        let mut c = circle(5.0, 5.0, 3.0, 0.0);
        c.alpha = 0.5;
        canvas.fill_circle(&c);
        let a = canvas.pixel(5, 5).unwrap()[3];
        assert!((126..=129).contains(&a), "alpha = {a}");
    }

    #[test]
    fn invisible_and_offscreen_circles_draw_nothing() {
        let mut canvas = Canvas::new(10, 10);
        let mut c = circle(5.0, 5.0, 3.0, 4.0);
        c.alpha = 0.0;
        canvas.fill_circle(&c);
        canvas.fill_circle(&circle(-50.0, -50.0, 2.0, 4.0));
        canvas.fill_circle(&circle(500.0, 5.0, 2.0, 4.0));
        assert!(canvas.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn non_finite_circle_draws_nothing() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_circle(&circle(f64::NAN, 5.0, 2.0, 8.0));
        canvas.fill_circle(&circle(5.0, f64::INFINITY, 2.0, 8.0));
        let mut c = circle(5.0, 5.0, 2.0, 8.0);
        c.alpha = f32::NAN;
        canvas.fill_circle(&c);
        assert!(canvas.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn clear_and_resize() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_circle(&circle(5.0, 5.0, 3.0, 0.0));
        canvas.clear();
        assert!(canvas.image().pixels().all(|p| p[3] == 0));

        canvas.set_size(30, 15);
        assert_eq!((canvas.width(), canvas.height()), (30, 15));
    }

    #[test]
    fn flattened_is_opaque() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill_circle(&circle(4.0, 4.0, 2.0, 0.0));
        let flat = canvas.flattened(Color::from_hex(0x0000FF));
        assert!(flat.pixels().all(|p| p[3] == 255));
        assert_eq!(*flat.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*flat.get_pixel(4, 4), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn factory_rejects_unusable_viewports() {
        let mut factory = CanvasFactory::with_max_dimension(100);
        assert!(factory.create(Viewport::new(0, 10)).is_err());
        assert!(factory.create(Viewport::new(101, 10)).is_err());
        let canvas = factory.create(Viewport::new(64, 32)).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (64, 32));
    }

    #[test]
    fn save_png_round_trip() {
        let mut canvas = Canvas::new(16, 16);
        canvas.fill_circle(&circle(8.0, 8.0, 4.0, 2.0));
        let path = std::env::temp_dir().join(format!("glimmer-canvas-{}.png", std::process::id()));
        canvas.save_png(&path, Some(Color::from_hex(0x000000))).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (16, 16));
        std::fs::remove_file(&path).unwrap();
    }
}
