//! Timed producer of ambient rain and on-demand bursts

use crate::config::SpawnerConfig;
use crate::particle::{Particle, ParticleStore};
use crate::rand::RandomSource;
use glimmer_core::{Color, Vec2};
use std::f64::consts::TAU;

/// What one spawn call did to the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnOutcome {
    pub added: usize,
    /// Particles refused because the store was at its soft cap
    pub dropped: usize,
}

impl SpawnOutcome {
    fn record(&mut self, added: bool) {
        if added {
            self.added += 1;
        } else {
            self.dropped += 1;
        }
    }
}

pub struct Spawner {
    config: SpawnerConfig,
}

impl Spawner {
    pub fn new(config: SpawnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// One spawn tick: one ambient particle, plus a second with `second_chance`
    pub fn spawn<R: RandomSource + ?Sized>(
        &self,
        store: &mut ParticleStore,
        surface_width: f64,
        rng: &mut R,
    ) -> SpawnOutcome {
        let mut outcome = SpawnOutcome::default();
        outcome.record(store.add(self.ambient(surface_width, rng)));
        if rng.chance(self.config.second_chance) {
            outcome.record(store.add(self.ambient(surface_width, rng)));
        }
        if outcome.dropped > 0 {
            log::trace!("store at soft cap, dropped {} spawn(s)", outcome.dropped);
        }
        outcome
    }

    /// Draw a fresh ambient particle just above the top edge
    pub fn ambient<R: RandomSource + ?Sized>(&self, surface_width: f64, rng: &mut R) -> Particle {
        let c = &self.config;
        let x = rng.range(0.0, surface_width.max(0.0));
        let vx = rng.range(-c.drift / 2.0, c.drift / 2.0);
        // Initial and steady-state fall speeds are drawn independently
        let vy = rng.range(c.fall_min, c.fall_max);
        let base_vy = rng.range(c.fall_min, c.fall_max);
        let color = self.pick_color(rng);
        let radius = rng.range(c.radius_min, c.radius_max);
        Particle::ambient(
            Vec2::new(x, c.spawn_offset_y),
            Vec2::new(vx, vy),
            base_vy,
            color,
            radius,
        )
    }

    /// Scatter `count` burst particles from `origin` in random directions
    pub fn burst<R: RandomSource + ?Sized>(
        &self,
        store: &mut ParticleStore,
        origin: Vec2,
        count: usize,
        rng: &mut R,
    ) -> SpawnOutcome {
        let c = &self.config;
        let mut outcome = SpawnOutcome::default();
        for _ in 0..count {
            let direction = Vec2::from_angle(rng.range(0.0, TAU));
            let speed = rng.range(c.burst_speed_min, c.burst_speed_max);
            let color = self.pick_color(rng);
            let radius = rng.range(c.radius_min, c.radius_max);
            outcome.record(store.add(Particle::burst(origin, direction * speed, color, radius)));
        }
        outcome
    }

    fn pick_color<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Color {
        let idx = rng.pick(self.config.palette.len());
        self.config.palette.get(idx).copied().unwrap_or(Color::WHITE)
    }
}
