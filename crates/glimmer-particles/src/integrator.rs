//! Per-frame particle motion and the eviction predicate

use crate::config::IntegratorConfig;
use crate::particle::{Particle, ParticleKind, ParticleStore};

/// Residual life below this is rounding error from repeated decay, not life
pub const LIFE_EPSILON: f64 = 1e-9;

pub struct Integrator {
    config: IntegratorConfig,
}

impl Integrator {
    pub fn new(config: IntegratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Advance every live particle by one frame
    pub fn step(&self, store: &mut ParticleStore) {
        store.for_each_live_mut(|p| self.advance(p));
    }

    /// Advance one particle by one frame.
    ///
    /// Ambient `vy` is recomputed from `x` rather than accumulated, so the sway
    /// stays bounded however long the rain runs.
    pub fn advance(&self, p: &mut Particle) {
        let c = &self.config;
        p.position = p.position + p.velocity;

        match p.kind {
            ParticleKind::Ambient => {
                p.velocity.y =
                    p.base_vy + c.sway_amplitude * (p.position.x * c.sway_frequency).sin();
            }
            ParticleKind::Burst => {
                p.velocity.y += c.gravity;
                p.life = (p.life - c.decay).max(0.0);
                if p.life < LIFE_EPSILON {
                    p.life = 0.0;
                }
            }
        }
    }

    /// True once a particle has fallen below the surface, run out of life,
    /// or lost its position to a non-finite value
    pub fn is_evicted(p: &Particle, surface_height: f64) -> bool {
        !p.position.y.is_finite() || p.position.y > surface_height || p.life <= 0.0
    }

    /// Remove evicted particles, returning how many were removed
    pub fn evict(store: &mut ParticleStore, surface_height: f64) -> usize {
        store.retire(|p| Self::is_evicted(p, surface_height))
    }
}
