//! Shared setup: config loading, host creation and mounting

use anyhow::{bail, Context, Result};
use glimmer_core::{Color, Vec2, Viewport};
use glimmer_particles::{FallingLight, ParticleRng, RainConfig};
use glimmer_raster::{Canvas, CanvasFactory};
use glimmer_runtime::Host;
use std::path::Path;

/// Particles per burst when `--burst x,y` omits the count
const DEFAULT_BURST_COUNT: usize = 40;

/// A `--burst x,y[,count]` request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstSpec {
    pub origin: Vec2,
    pub count: usize,
}

/// Options common to every command that mounts the rain
pub struct SessionArgs {
    pub width: u32,
    pub height: u32,
    pub seed: Option<u32>,
    pub config: Option<String>,
    pub bursts: Vec<BurstSpec>,
}

pub struct Session {
    pub host: Host,
    pub rain: FallingLight<Canvas, ParticleRng>,
    pub config: RainConfig,
}

impl Session {
    pub fn start(args: &SessionArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => RainConfig::load(Path::new(path))
                .with_context(|| format!("Failed to load config {path}"))?,
            None => RainConfig::default(),
        };

        let rng = match args.seed {
            Some(seed) => ParticleRng::new(seed),
            None => ParticleRng::from_time(),
        };

        let mut host = Host::new(Viewport::new(args.width, args.height), config.refresh_hz);
        let Some(mut rain) = FallingLight::mount(&mut host, &mut CanvasFactory::new(), &config, rng)
        else {
            bail!(
                "Could not create a {}x{} drawing surface",
                args.width,
                args.height
            );
        };

        for burst in &args.bursts {
            let outcome = rain.burst(burst.origin, burst.count);
            log::info!(
                "burst at ({}, {}): {} particle(s)",
                burst.origin.x,
                burst.origin.y,
                outcome.added
            );
        }

        Ok(Self { host, rain, config })
    }
}

pub fn parse_burst(s: &str) -> Result<BurstSpec, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(format!(
            "expected x,y or x,y,count, got {} value(s)",
            parts.len()
        ));
    }
    let x: f64 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f64 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("origin must be finite, got {x},{y}"));
    }
    let count = match parts.get(2) {
        Some(c) => c.trim().parse().map_err(|e| format!("invalid count: {}", e))?,
        None => DEFAULT_BURST_COUNT,
    };
    Ok(BurstSpec {
        origin: Vec2::new(x, y),
        count,
    })
}

pub fn parse_color(s: &str) -> Result<Color, String> {
    Color::parse_hex(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_burst_with_and_without_count() {
        let b = parse_burst("100, 50").unwrap();
        assert_eq!(b.origin, Vec2::new(100.0, 50.0));
        assert_eq!(b.count, DEFAULT_BURST_COUNT);

        let b = parse_burst("1.5,2,12").unwrap();
        assert_eq!(b.origin, Vec2::new(1.5, 2.0));
        assert_eq!(b.count, 12);
    }

    #[test]
    fn parse_burst_rejects_garbage() {
        assert!(parse_burst("1").is_err());
        assert!(parse_burst("a,b").is_err());
        assert!(parse_burst("1,2,-3").is_err());
        assert!(parse_burst("1,2,3,4").is_err());
        assert!(parse_burst("nan,5").is_err());
        assert!(parse_burst("5,inf,3").is_err());
    }

    #[test]
    fn session_mounts_with_seed() {
        let args = SessionArgs {
            width: 320,
            height: 240,
            seed: Some(7),
            config: None,
            bursts: vec![parse_burst("160,120,10").unwrap()],
        };
        let session = Session::start(&args).unwrap();
        assert!(session.rain.is_running());
        assert_eq!(session.rain.store().len(), 10);
        assert_eq!(session.host.live_timers(), 2);
    }

    #[test]
    fn session_fails_without_surface() {
        let args = SessionArgs {
            width: 0,
            height: 240,
            seed: Some(7),
            config: None,
            bursts: Vec::new(),
        };
        assert!(Session::start(&args).is_err());
    }
}
