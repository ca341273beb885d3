//! The mounted rain instance: frame driver, spawn driver, resize listener

use crate::config::RainConfig;
use crate::integrator::Integrator;
use crate::particle::ParticleStore;
use crate::rand::RandomSource;
use crate::render::Renderer;
use crate::sizing::sync_to_viewport;
use crate::spawner::{SpawnOutcome, Spawner};
use crate::surface::{Surface, SurfaceFactory};
use glimmer_core::{Result, Vec2};
use glimmer_runtime::{Component, Host, HostEvent, ListenerHandle, TimerHandle};
use serde::Serialize;

/// Running totals for one instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RainStats {
    pub frames: u64,
    pub spawn_events: u64,
    pub spawned: u64,
    pub dropped: u64,
    pub evicted: u64,
    pub resizes: u64,
}

impl RainStats {
    fn record_spawn(&mut self, outcome: SpawnOutcome) {
        self.spawned += outcome.added as u64;
        self.dropped += outcome.dropped as u64;
    }
}

/// Both drivers and the resize listener. Created together, dropped together.
struct Drivers {
    frame: TimerHandle,
    spawn: TimerHandle,
    resize: ListenerHandle,
}

impl Drivers {
    fn start(host: &mut Host, config: &RainConfig) -> Self {
        Self {
            frame: host.request_frames_at(config.refresh_hz),
            spawn: host.set_interval(config.spawn_interval()),
            resize: host.add_resize_listener(),
        }
    }

    fn cancel(self) {
        self.frame.cancel();
        self.spawn.cancel();
        self.resize.cancel();
    }
}

/// One falling-light animation mounted on one surface
pub struct FallingLight<S: Surface, R: RandomSource> {
    store: ParticleStore,
    spawner: Spawner,
    integrator: Integrator,
    renderer: Renderer,
    surface: S,
    rng: R,
    drivers: Option<Drivers>,
    stats: RainStats,
}

impl<S: Surface, R: RandomSource> FallingLight<S, R> {
    /// Create the surface, size it to the viewport and start both drivers.
    ///
    /// Returns `None` without registering anything if the surface cannot be
    /// created or the configuration is unusable; the animation simply does
    /// not appear.
    pub fn mount<F>(host: &mut Host, factory: &mut F, config: &RainConfig, rng: R) -> Option<Self>
    where
        F: SurfaceFactory<Surface = S>,
    {
        if let Err(e) = config.validate() {
            log::debug!("rain not mounted: {e}");
            return None;
        }
        let viewport = host.viewport();
        let mut surface = match factory.create(viewport) {
            Ok(surface) => surface,
            Err(e) => {
                log::debug!("rain not mounted: {e}");
                return None;
            }
        };
        sync_to_viewport(&mut surface, viewport);

        let drivers = Drivers::start(host, config);
        log::debug!(
            "rain mounted on {}x{} surface, spawning every {}ms",
            viewport.width,
            viewport.height,
            config.spawn_interval_ms
        );

        Some(Self {
            store: ParticleStore::new(config.max_particles),
            spawner: Spawner::new(config.spawner.clone()),
            integrator: Integrator::new(config.integrator.clone()),
            renderer: Renderer::new(config.renderer.clone()),
            surface,
            rng,
            drivers: Some(drivers),
            stats: RainStats::default(),
        })
    }

    /// Route one host event. Events that do not belong to this instance, or
    /// arrive after teardown, are ignored.
    pub fn handle_event(&mut self, host: &Host, event: &HostEvent) {
        let Some(drivers) = &self.drivers else {
            return;
        };
        let (frame, spawn, resize) = (drivers.frame.id(), drivers.spawn.id(), drivers.resize.id());
        match *event {
            HostEvent::Timer { id, .. } if id == frame => self.on_frame(),
            HostEvent::Timer { id, .. } if id == spawn => self.on_spawn(),
            HostEvent::Resize { listener } if listener == resize => {
                if sync_to_viewport(&mut self.surface, host.viewport()) {
                    self.stats.resizes += 1;
                }
            }
            _ => {}
        }
    }

    /// Integrate, then paint, then evict
    fn on_frame(&mut self) {
        self.integrator.step(&mut self.store);
        self.renderer.paint(&self.store, &mut self.surface);
        let evicted = Integrator::evict(&mut self.store, self.surface.height() as f64);
        self.stats.frames += 1;
        self.stats.evicted += evicted as u64;
    }

    fn on_spawn(&mut self) {
        let width = self.surface.width() as f64;
        let outcome = self.spawner.spawn(&mut self.store, width, &mut self.rng);
        self.stats.spawn_events += 1;
        self.stats.record_spawn(outcome);
    }

    /// Scatter burst particles from `origin`. Ignored after teardown.
    pub fn burst(&mut self, origin: Vec2, count: usize) -> SpawnOutcome {
        if self.drivers.is_none() {
            return SpawnOutcome::default();
        }
        let outcome = self.spawner.burst(&mut self.store, origin, count, &mut self.rng);
        self.stats.record_spawn(outcome);
        outcome
    }

    /// Cancel both drivers and remove the resize listener. Idempotent.
    pub fn teardown(&mut self) {
        if let Some(drivers) = self.drivers.take() {
            drivers.cancel();
            log::debug!(
                "rain torn down after {} frame(s), {} live particle(s)",
                self.stats.frames,
                self.store.len()
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.drivers.is_some()
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn stats(&self) -> RainStats {
        self.stats
    }
}

impl<S: Surface, R: RandomSource> Component for FallingLight<S, R> {
    fn handle(&mut self, host: &Host, event: &HostEvent) -> Result<()> {
        self.handle_event(host, event);
        Ok(())
    }

    fn teardown(&mut self) {
        FallingLight::teardown(self);
    }

    fn is_running(&self) -> bool {
        FallingLight::is_running(self)
    }

    fn name(&self) -> &str {
        "falling-light"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleKind;
    use crate::rand::{ParticleRng, SequenceRng};
    use crate::surface::{DrawOp, RecordingFactory, RecordingSurface};
    use glimmer_core::Viewport;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn host() -> Host {
        Host::new(Viewport::new(800, 600), 60.0)
    }

    fn mount_with<R: RandomSource>(host: &mut Host, rng: R) -> FallingLight<RecordingSurface, R> {
        FallingLight::mount(host, &mut RecordingFactory::new(), &RainConfig::default(), rng)
            .expect("mount")
    }

    /// Dispatch only spawn ticks so nothing is integrated or evicted
    fn run_spawns_only<R: RandomSource>(
        host: &mut Host,
        rain: &mut FallingLight<RecordingSurface, R>,
        until: Duration,
    ) {
        while let Some(event) = host.poll(until) {
            let is_frame = matches!(
                (event, &rain.drivers),
                (HostEvent::Timer { id, .. }, Some(d)) if id == d.frame.id()
            );
            if !is_frame {
                rain.handle_event(host, &event);
            }
        }
    }

    #[test]
    fn mount_sizes_surface_and_starts_drivers() {
        let mut host = host();
        let rain = mount_with(&mut host, ParticleRng::new(1));
        assert!(rain.is_running());
        assert_eq!(rain.surface().width(), 800);
        assert_eq!(rain.surface().height(), 600);
        assert_eq!(host.live_timers(), 2);
        assert_eq!(host.live_listeners(), 1);
    }

    #[test]
    fn unavailable_surface_starts_nothing() {
        let mut host = host();
        let rain: Option<FallingLight<RecordingSurface, ParticleRng>> = FallingLight::mount(
            &mut host,
            &mut RecordingFactory::unavailable(),
            &RainConfig::default(),
            ParticleRng::new(1),
        );
        assert!(rain.is_none());
        assert_eq!(host.live_timers(), 0);
        assert_eq!(host.live_listeners(), 0);
    }

    #[test]
    fn invalid_config_starts_nothing() {
        let mut host = host();
        let config = RainConfig {
            spawn_interval_ms: 0,
            ..RainConfig::default()
        };
        let rain = FallingLight::mount(
            &mut host,
            &mut RecordingFactory::new(),
            &config,
            ParticleRng::new(1),
        );
        assert!(rain.is_none());
        assert_eq!(host.live_timers(), 0);
    }

    #[test]
    fn three_spawn_events_in_350ms() {
        let mut host = host();
        let mut rain = mount_with(&mut host, ParticleRng::new(42));
        run_spawns_only(&mut host, &mut rain, ms(350));

        assert_eq!(rain.stats().spawn_events, 3);
        let live = rain.store().len();
        assert!((3..=6).contains(&live), "live = {live}");
        assert_eq!(rain.stats().spawned, live as u64);
    }

    #[test]
    fn spawn_count_matches_cadence() {
        let mut host = host();
        let mut rain = mount_with(&mut host, ParticleRng::new(9));
        host.run_until(ms(2_050), &mut rain).unwrap();
        assert_eq!(rain.stats().spawn_events, 20);
        assert!(rain.stats().spawned >= 20 && rain.stats().spawned <= 40);
    }

    #[test]
    fn frame_driver_follows_configured_rate() {
        let mut host = host();
        let config = RainConfig {
            refresh_hz: 120.0,
            ..RainConfig::default()
        };
        let mut rain =
            FallingLight::mount(&mut host, &mut RecordingFactory::new(), &config, ParticleRng::new(4))
                .expect("mount");
        host.run_until(ms(1_001), &mut rain).unwrap();
        assert_eq!(rain.stats().frames, 120);
        assert_eq!(rain.stats().spawn_events, 10);
    }

    #[test]
    fn frame_runs_integrate_paint_evict() {
        let mut host = host();
        // Low rolls: x = 0, second particle always spawned
        let mut rain = mount_with(&mut host, SequenceRng::constant(0.0));
        host.run_until(ms(101), &mut rain).unwrap();

        assert_eq!(rain.stats().spawn_events, 1);
        assert_eq!(rain.stats().frames, 6);
        assert_eq!(rain.store().len(), 2);
        assert!(rain.store().iter().all(|p| p.kind == ParticleKind::Ambient));

        host.run_until(ms(117), &mut rain).unwrap();
        assert_eq!(rain.stats().frames, 7);
        let frame = rain.surface().last_frame();
        assert_eq!(frame.len(), 2);
        // Drawn after integration: one step below the spawn height
        assert!(frame.iter().all(|c| c.center.y > -10.0));
    }

    #[test]
    fn rain_falls_off_the_bottom() {
        let mut host = Host::new(Viewport::new(200, 50), 60.0);
        let mut rain = mount_with(&mut host, ParticleRng::new(11));
        host.run_until(ms(1_000), &mut rain).unwrap();
        let first_wave = rain.stats().spawned;

        // Fall speed is at least 0.6px/frame; 60px takes at most 100 frames
        host.run_until(ms(4_000), &mut rain).unwrap();
        assert!(rain.stats().evicted >= first_wave);
        assert!(rain.store().iter().all(|p| p.position.y <= 50.0));
    }

    #[test]
    fn teardown_stops_all_mutation() {
        let mut host = host();
        let mut rain = mount_with(&mut host, ParticleRng::new(5));
        host.run_until(ms(500), &mut rain).unwrap();

        rain.teardown();
        rain.teardown();
        assert!(!rain.is_running());
        assert_eq!(host.live_timers(), 0);
        assert_eq!(host.live_listeners(), 0);

        let stats = rain.stats();
        let snapshot = rain.store().as_slice().to_vec();
        host.resize(Viewport::new(100, 100));
        host.run_until(ms(10_000), &mut rain).unwrap();

        assert_eq!(rain.stats(), stats);
        assert_eq!(rain.store().as_slice(), snapshot.as_slice());
        assert_eq!(rain.burst(Vec2::new(10.0, 10.0), 5), SpawnOutcome::default());
        assert_eq!(rain.store().len(), snapshot.len());
    }

    #[test]
    fn dropping_instance_releases_host_timers() {
        let mut host = host();
        {
            let _rain = mount_with(&mut host, ParticleRng::new(5));
            assert_eq!(host.live_timers(), 2);
        }
        assert_eq!(host.live_timers(), 0);
        assert_eq!(host.live_listeners(), 0);
    }

    #[test]
    fn foreign_events_are_ignored() {
        let mut host = host();
        let mut rain = mount_with(&mut host, ParticleRng::new(5));
        let other = host.set_interval(ms(10));
        host.run_until(ms(55), &mut rain).unwrap();
        assert_eq!(rain.stats().spawn_events, 0);
        assert_eq!(rain.stats().frames, 3);
        drop(other);
    }

    #[test]
    fn resize_changes_bounds_not_particles() {
        let mut host = host();
        let mut rain = mount_with(&mut host, ParticleRng::new(8));
        rain.burst(Vec2::new(700.0, 300.0), 3);
        let before: Vec<_> = rain.store().iter().map(|p| p.position).collect();

        host.resize(Viewport::new(400, 200));
        // Deliver only the resize notification
        let event = host.poll(Duration::ZERO).unwrap();
        assert!(matches!(event, HostEvent::Resize { .. }));
        rain.handle_event(&host, &event);

        assert_eq!(rain.surface().width(), 400);
        assert_eq!(rain.surface().height(), 200);
        assert_eq!(rain.stats().resizes, 1);
        let after: Vec<_> = rain.store().iter().map(|p| p.position).collect();
        assert_eq!(before, after);
        assert!(rain
            .surface()
            .ops()
            .contains(&DrawOp::Resize { width: 400, height: 200 }));
    }

    #[test]
    fn burst_particles_decay_out() {
        let mut host = host();
        let mut rain = mount_with(&mut host, ParticleRng::new(21));
        let outcome = rain.burst(Vec2::new(400.0, 100.0), 30);
        assert_eq!(outcome.added, 30);

        // 50 frames at 60Hz is ~833ms; no ambient spawns can be bursts
        host.run_until(ms(850), &mut rain).unwrap();
        assert!(rain
            .store()
            .iter()
            .all(|p| p.kind == ParticleKind::Ambient));
    }

    #[test]
    fn component_trait_drives_instance() {
        let mut host = host();
        let mut rain = mount_with(&mut host, ParticleRng::new(3));
        {
            let component: &mut dyn Component = &mut rain;
            assert_eq!(component.name(), "falling-light");
            host.run_until(ms(300), component).unwrap();
            component.teardown();
            assert!(!component.is_running());
        }
        assert_eq!(rain.stats().spawn_events, 3);
    }
}
