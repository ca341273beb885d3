//! Glimmer Particles - ambient falling-light rain
//!
//! Provides one self-contained particle animation per mounted surface:
//! - Contiguous particle store with swap-remove eviction
//! - Fixed-cadence spawner with injectable randomness
//! - Per-frame integrator (sine-swayed rain, gravity-driven bursts)
//! - Renderer projecting the store onto any `Surface`
//! - `FallingLight`, which owns the frame/spawn drivers and tears them down together

pub mod config;
pub mod integrator;
pub mod particle;
pub mod rand;
pub mod render;
pub mod scheduler;
pub mod sizing;
pub mod spawner;
pub mod surface;

pub use config::{IntegratorConfig, RainConfig, RendererConfig, SpawnerConfig};
pub use integrator::Integrator;
pub use particle::{Particle, ParticleKind, ParticleStore};
pub use rand::{ParticleRng, RandomSource, SequenceRng};
pub use render::Renderer;
pub use scheduler::{FallingLight, RainStats};
pub use spawner::{SpawnOutcome, Spawner};
pub use surface::{CircleDraw, DrawOp, RecordingFactory, RecordingSurface, Surface, SurfaceFactory};
