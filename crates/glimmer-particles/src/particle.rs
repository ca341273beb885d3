//! Particle records and the live particle store

use glimmer_core::{Color, Vec2};

/// Live particle cap used when the configuration does not set one
pub const DEFAULT_SOFT_CAP: usize = 4000;

/// Selects the integration rule applied to a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Non-decaying falling rain with a sine sway
    Ambient,
    /// Decaying, gravity-accelerated spark
    Burst,
}

/// One particle. Position and velocity are in surface pixels (y grows down)
/// and per-frame displacement.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Unperturbed fall speed that ambient `velocity.y` is recomputed from
    pub base_vy: f64,
    pub life: f64,
    pub max_life: f64,
    pub color: Color,
    pub radius: f64,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn ambient(position: Vec2, velocity: Vec2, base_vy: f64, color: Color, radius: f64) -> Self {
        Self {
            position,
            velocity,
            base_vy,
            life: 1.0,
            max_life: 1.0,
            color,
            radius,
            kind: ParticleKind::Ambient,
        }
    }

    pub fn burst(position: Vec2, velocity: Vec2, color: Color, radius: f64) -> Self {
        Self {
            position,
            velocity,
            base_vy: velocity.y,
            life: 1.0,
            max_life: 1.0,
            color,
            radius,
            kind: ParticleKind::Burst,
        }
    }
}

/// Owns every live particle of one running instance.
///
/// Particles sit in a contiguous `Vec`; removal swaps the victim with the last
/// element and pops, walking indices in reverse so each particle is visited
/// exactly once per pass.
pub struct ParticleStore {
    particles: Vec<Particle>,
    soft_cap: usize,
}

impl Default for ParticleStore {
    fn default() -> Self {
        Self::new(DEFAULT_SOFT_CAP)
    }
}

impl ParticleStore {
    pub fn new(soft_cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(soft_cap.min(1024)),
            soft_cap,
        }
    }

    pub fn soft_cap(&self) -> usize {
        self.soft_cap
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.soft_cap
    }

    /// Append a particle. Returns false (and drops it) once the soft cap is reached.
    pub fn add(&mut self, particle: Particle) -> bool {
        if self.is_full() {
            return false;
        }
        self.particles.push(particle);
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Visit every live particle once
    pub fn for_each_live(&self, mut visitor: impl FnMut(&Particle)) {
        for p in &self.particles {
            visitor(p);
        }
    }

    /// Visit every live particle once, mutably
    pub fn for_each_live_mut(&mut self, mut visitor: impl FnMut(&mut Particle)) {
        for p in &mut self.particles {
            visitor(p);
        }
    }

    /// Remove every particle matching `predicate`, returning how many were removed
    pub fn retire(&mut self, mut predicate: impl FnMut(&Particle) -> bool) -> usize {
        let mut removed = 0;
        for i in (0..self.particles.len()).rev() {
            if predicate(&self.particles[i]) {
                // The element swapped into `i` comes from a higher index and was already checked
                self.particles.swap_remove(i);
                removed += 1;
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
