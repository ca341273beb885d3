//! Rain configuration (parsed from TOML) with per-field defaults

use crate::particle::DEFAULT_SOFT_CAP;
use glimmer_core::{Color, GlimmerError, Result};
use std::path::Path;
use std::time::Duration;

/// Hard ceiling on `max_particles`
const MAX_PARTICLES_LIMIT: usize = 50_000;

/// Default rain palette
pub const DEFAULT_PALETTE: [u32; 9] = [
    0xFF006E, 0xFB5607, 0xFFBE0B, 0x8338EC, 0x3A86FF, 0x06FFA5, 0xFF4365, 0x06D9FF, 0xFFD60A,
];

/// How new particles are drawn
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnerConfig {
    /// Probability of a second ambient particle per spawn tick
    pub second_chance: f64,
    /// Spawn height; negative places particles just above the top edge
    pub spawn_offset_y: f64,
    /// Width of the symmetric horizontal velocity range
    pub drift: f64,
    pub fall_min: f64,
    pub fall_max: f64,
    pub radius_min: f64,
    pub radius_max: f64,
    pub palette: Vec<Color>,
    pub burst_speed_min: f64,
    pub burst_speed_max: f64,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            second_chance: 0.4,
            spawn_offset_y: -10.0,
            drift: 0.5,
            fall_min: 0.8,
            fall_max: 1.2,
            radius_min: 1.5,
            radius_max: 2.5,
            palette: DEFAULT_PALETTE.iter().map(|&hex| Color::from_hex(hex)).collect(),
            burst_speed_min: 1.0,
            burst_speed_max: 4.0,
        }
    }
}

/// Per-frame motion constants
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorConfig {
    pub sway_amplitude: f64,
    pub sway_frequency: f64,
    /// Downward acceleration of burst particles, in px/frame²
    pub gravity: f64,
    /// Life lost by burst particles each frame
    pub decay: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            sway_amplitude: 0.2,
            sway_frequency: 0.01,
            gravity: 0.08,
            decay: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Opacity multiplier applied to `life`
    pub dimming: f64,
    /// Glow halo blur radius in pixels
    pub glow_blur: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            dimming: 0.7,
            glow_blur: 8.0,
        }
    }
}

/// Everything one running rain instance needs
#[derive(Debug, Clone, PartialEq)]
pub struct RainConfig {
    pub spawn_interval_ms: u64,
    pub refresh_hz: f64,
    pub max_particles: usize,
    pub spawner: SpawnerConfig,
    pub integrator: IntegratorConfig,
    pub renderer: RendererConfig,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 100,
            refresh_hz: 60.0,
            max_particles: DEFAULT_SOFT_CAP,
            spawner: SpawnerConfig::default(),
            integrator: IntegratorConfig::default(),
            renderer: RendererConfig::default(),
        }
    }
}

impl RainConfig {
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Load, parse and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let table: toml::value::Table = toml::from_str(&content)?;
        let config = Self::from_toml(&table)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a RainConfig from a TOML table. Missing keys keep their defaults.
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = table.get("spawn_interval_ms") {
            config.spawn_interval_ms = toml_count(v, config.spawn_interval_ms as i64) as u64;
        }
        if let Some(v) = table.get("refresh_hz") {
            config.refresh_hz = toml_f64(v, config.refresh_hz);
        }
        if let Some(v) = table.get("max_particles") {
            let n = toml_count(v, config.max_particles as i64) as usize;
            if n > MAX_PARTICLES_LIMIT {
                log::warn!("max_particles {n} exceeds {MAX_PARTICLES_LIMIT}, clamping");
            }
            config.max_particles = n.min(MAX_PARTICLES_LIMIT);
        }

        if let Some(spawner) = table.get("spawner").and_then(|v| v.as_table()) {
            let s = &mut config.spawner;
            read_f64(spawner, "second_chance", &mut s.second_chance);
            read_f64(spawner, "spawn_offset_y", &mut s.spawn_offset_y);
            read_f64(spawner, "drift", &mut s.drift);
            read_f64(spawner, "fall_min", &mut s.fall_min);
            read_f64(spawner, "fall_max", &mut s.fall_max);
            read_f64(spawner, "radius_min", &mut s.radius_min);
            read_f64(spawner, "radius_max", &mut s.radius_max);
            read_f64(spawner, "burst_speed_min", &mut s.burst_speed_min);
            read_f64(spawner, "burst_speed_max", &mut s.burst_speed_max);
            if let Some(v) = spawner.get("palette") {
                s.palette = toml_palette(v)?;
            }
        }

        if let Some(integrator) = table.get("integrator").and_then(|v| v.as_table()) {
            let i = &mut config.integrator;
            read_f64(integrator, "sway_amplitude", &mut i.sway_amplitude);
            read_f64(integrator, "sway_frequency", &mut i.sway_frequency);
            read_f64(integrator, "gravity", &mut i.gravity);
            read_f64(integrator, "decay", &mut i.decay);
        }

        if let Some(renderer) = table.get("renderer").and_then(|v| v.as_table()) {
            read_f64(renderer, "dimming", &mut config.renderer.dimming);
            let mut blur = config.renderer.glow_blur as f64;
            read_f64(renderer, "glow_blur", &mut blur);
            config.renderer.glow_blur = blur as f32;
        }

        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.float_fields() {
            if !value.is_finite() {
                return Err(GlimmerError::out_of_range(field, f64::MIN, f64::MAX, value));
            }
        }
        if self.spawn_interval_ms == 0 {
            return Err(GlimmerError::InvalidConfig(
                "spawn_interval_ms must be positive".into(),
            ));
        }
        if !(self.refresh_hz > 0.0 && self.refresh_hz <= 1000.0) {
            return Err(GlimmerError::out_of_range("refresh_hz", 0.0, 1000.0, self.refresh_hz));
        }
        if self.max_particles == 0 {
            return Err(GlimmerError::InvalidConfig("max_particles must be positive".into()));
        }

        let s = &self.spawner;
        if !(0.0..=1.0).contains(&s.second_chance) {
            return Err(GlimmerError::out_of_range("second_chance", 0.0, 1.0, s.second_chance));
        }
        if s.drift < 0.0 {
            return Err(GlimmerError::out_of_range("drift", 0.0, f64::MAX, s.drift));
        }
        check_range("fall", s.fall_min, s.fall_max)?;
        if s.fall_min <= 0.0 {
            return Err(GlimmerError::out_of_range("fall_min", 0.0, f64::MAX, s.fall_min));
        }
        check_range("radius", s.radius_min, s.radius_max)?;
        if s.radius_min <= 0.0 {
            return Err(GlimmerError::out_of_range("radius_min", 0.0, f64::MAX, s.radius_min));
        }
        check_range("burst_speed", s.burst_speed_min, s.burst_speed_max)?;
        if s.palette.is_empty() {
            return Err(GlimmerError::InvalidConfig("palette must not be empty".into()));
        }

        let i = &self.integrator;
        if i.decay <= 0.0 {
            return Err(GlimmerError::out_of_range("decay", 0.0, 1.0, i.decay));
        }

        let r = &self.renderer;
        if !(0.0..=1.0).contains(&r.dimming) {
            return Err(GlimmerError::out_of_range("dimming", 0.0, 1.0, r.dimming));
        }
        if r.glow_blur < 0.0 {
            return Err(GlimmerError::out_of_range(
                "glow_blur",
                0.0,
                f64::MAX,
                r.glow_blur as f64,
            ));
        }

        Ok(())
    }

    fn float_fields(&self) -> [(&'static str, f64); 16] {
        let (s, i, r) = (&self.spawner, &self.integrator, &self.renderer);
        [
            ("refresh_hz", self.refresh_hz),
            ("second_chance", s.second_chance),
            ("spawn_offset_y", s.spawn_offset_y),
            ("drift", s.drift),
            ("fall_min", s.fall_min),
            ("fall_max", s.fall_max),
            ("radius_min", s.radius_min),
            ("radius_max", s.radius_max),
            ("burst_speed_min", s.burst_speed_min),
            ("burst_speed_max", s.burst_speed_max),
            ("sway_amplitude", i.sway_amplitude),
            ("sway_frequency", i.sway_frequency),
            ("gravity", i.gravity),
            ("decay", i.decay),
            ("dimming", r.dimming),
            ("glow_blur", r.glow_blur as f64),
        ]
    }
}

fn check_range(name: &str, min: f64, max: f64) -> Result<()> {
    if min > max {
        return Err(GlimmerError::InvalidConfig(format!(
            "{name}_min ({min}) is greater than {name}_max ({max})"
        )));
    }
    Ok(())
}

// ── TOML helpers (handle integer/float coercion) ──

fn toml_f64(v: &toml::Value, default: f64) -> f64 {
    v.as_float()
        .or_else(|| v.as_integer().map(|i| i as f64))
        .unwrap_or_else(|| {
            log::warn!("expected a number, got {v}; keeping {default}");
            default
        })
}

/// Non-negative integer; anything else keeps `default`
fn toml_count(v: &toml::Value, default: i64) -> i64 {
    match v.as_integer() {
        Some(n) if n >= 0 => n,
        _ => {
            log::warn!("expected a non-negative integer, got {v}; keeping {default}");
            default
        }
    }
}

fn read_f64(table: &toml::value::Table, key: &str, target: &mut f64) {
    if let Some(v) = table.get(key) {
        *target = toml_f64(v, *target);
    }
}

fn toml_palette(v: &toml::Value) -> Result<Vec<Color>> {
    let arr = v
        .as_array()
        .ok_or_else(|| GlimmerError::InvalidConfig("palette must be an array".into()))?;
    arr.iter()
        .map(|entry| {
            entry
                .as_str()
                .ok_or_else(|| GlimmerError::InvalidColor(entry.to_string()))
                .and_then(Color::parse_hex)
        })
        .collect()
}
