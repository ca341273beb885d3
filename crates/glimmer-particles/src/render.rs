//! Projects the particle store onto a surface

use crate::config::RendererConfig;
use crate::particle::{Particle, ParticleStore};
use crate::surface::{CircleDraw, Surface};

pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Opacity of a particle: `life * dimming`, clamped to [0, 1]
    pub fn opacity(&self, p: &Particle) -> f32 {
        (p.life * self.config.dimming).clamp(0.0, 1.0) as f32
    }

    /// Clear the surface and draw every live particle. Returns circles drawn.
    pub fn paint<S: Surface + ?Sized>(&self, store: &ParticleStore, surface: &mut S) -> usize {
        surface.clear();
        let mut drawn = 0;
        store.for_each_live(|p| {
            surface.fill_circle(&CircleDraw {
                center: p.position,
                radius: p.radius,
                color: p.color,
                alpha: self.opacity(p),
                glow: self.config.glow_blur,
            });
            drawn += 1;
        });
        drawn
    }
}
