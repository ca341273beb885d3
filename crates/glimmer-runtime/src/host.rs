//! Single-threaded cooperative host loop
//!
//! The host owns the time sources a mounted component reacts to: perpetual
//! display-refresh timers, fixed-cadence interval timers and resize
//! notifications. Time is virtual; `poll` advances it to the next due tick,
//! so a run over `T` fires exactly `floor(T / period)` ticks per timer.
//! `run_realtime` drives the same loop against the wall clock.

use crate::clock::Cadence;
use crate::system::Component;
use glimmer_core::{Result, Viewport};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Identifies a timer registered with a [`Host`]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Identifies a resize listener registered with a [`Host`]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Something the host delivers to a mounted component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// A frame or interval timer fired at host time `at`
    Timer { id: TimerId, at: Duration },
    /// The viewport changed; read `Host::viewport` for the new size
    Resize { listener: ListenerId },
}

/// Cancels its timer when `cancel` is called or the handle is dropped
#[must_use = "dropping a TimerHandle cancels the timer"]
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    live: Rc<Cell<bool>>,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    /// Cancel the timer. Idempotent.
    pub fn cancel(&self) {
        self.live.set(false);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Removes its resize listener when `cancel` is called or the handle is dropped
#[must_use = "dropping a ListenerHandle removes the listener"]
#[derive(Debug)]
pub struct ListenerHandle {
    id: ListenerId,
    live: Rc<Cell<bool>>,
}

impl ListenerHandle {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    /// Remove the listener. Idempotent.
    pub fn cancel(&self) {
        self.live.set(false);
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct TimerEntry {
    id: TimerId,
    cadence: Cadence,
    live: Rc<Cell<bool>>,
}

struct ListenerEntry {
    id: ListenerId,
    live: Rc<Cell<bool>>,
}

/// Virtual-time event loop standing in for the hosting page
pub struct Host {
    now: Duration,
    viewport: Viewport,
    refresh_hz: f64,
    next_id: u64,
    timers: Vec<TimerEntry>,
    listeners: Vec<ListenerEntry>,
    pending: VecDeque<HostEvent>,
}

impl Default for Host {
    fn default() -> Self {
        Self::new(Viewport::default(), 60.0)
    }
}

impl Host {
    pub fn new(viewport: Viewport, refresh_hz: f64) -> Self {
        Self {
            now: Duration::ZERO,
            viewport,
            refresh_hz,
            next_id: 1,
            timers: Vec::new(),
            listeners: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Current host time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Current viewport dimensions
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn refresh_hz(&self) -> f64 {
        self.refresh_hz
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Register a perpetual timer ticking once per display refresh
    pub fn request_frames(&mut self) -> TimerHandle {
        self.request_frames_at(self.refresh_hz)
    }

    /// Register a perpetual frame timer at `hz` instead of the display rate
    pub fn request_frames_at(&mut self, hz: f64) -> TimerHandle {
        let cadence = Cadence::from_hz(self.now, hz);
        self.register_timer(cadence)
    }

    /// Register a perpetual timer ticking every `period`, first at `now + period`
    pub fn set_interval(&mut self, period: Duration) -> TimerHandle {
        let cadence = Cadence::new(self.now, period);
        self.register_timer(cadence)
    }

    fn register_timer(&mut self, cadence: Cadence) -> TimerHandle {
        let id = TimerId(self.allocate_id());
        let live = Rc::new(Cell::new(true));
        self.timers.push(TimerEntry {
            id,
            cadence,
            live: Rc::clone(&live),
        });
        TimerHandle { id, live }
    }

    /// Register a listener for viewport changes
    pub fn add_resize_listener(&mut self) -> ListenerHandle {
        let id = ListenerId(self.allocate_id());
        let live = Rc::new(Cell::new(true));
        self.listeners.push(ListenerEntry {
            id,
            live: Rc::clone(&live),
        });
        ListenerHandle { id, live }
    }

    /// Change the viewport and notify every live listener
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.prune();
        for listener in &self.listeners {
            self.pending.push_back(HostEvent::Resize {
                listener: listener.id,
            });
        }
    }

    /// Number of timers that have not been cancelled
    pub fn live_timers(&self) -> usize {
        self.timers.iter().filter(|t| t.live.get()).count()
    }

    /// Number of resize listeners that have not been removed
    pub fn live_listeners(&self) -> usize {
        self.listeners.iter().filter(|l| l.live.get()).count()
    }

    /// Earliest due time over all live timers
    pub fn next_due(&self) -> Option<Duration> {
        self.timers
            .iter()
            .filter(|t| t.live.get())
            .map(|t| t.cadence.next_due())
            .min()
    }

    fn prune(&mut self) {
        self.timers.retain(|t| t.live.get());
        self.listeners.retain(|l| l.live.get());
    }

    fn listener_is_live(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|l| l.id == id && l.live.get())
    }

    /// Return the next event due at or before `until`, advancing host time.
    ///
    /// Pending resize notifications come first, then the earliest due timer
    /// (ties go to the timer registered first). Returns `None` once nothing
    /// is due, leaving host time at `until`.
    pub fn poll(&mut self, until: Duration) -> Option<HostEvent> {
        self.prune();

        while let Some(event) = self.pending.pop_front() {
            if let HostEvent::Resize { listener } = event {
                if !self.listener_is_live(listener) {
                    continue;
                }
            }
            return Some(event);
        }

        let due = self
            .timers
            .iter_mut()
            .filter(|t| t.cadence.is_due(until))
            .min_by_key(|t| (t.cadence.next_due(), t.id));

        match due {
            Some(entry) => {
                let at = entry.cadence.next_due();
                entry.cadence.consume();
                self.now = self.now.max(at);
                Some(HostEvent::Timer { id: entry.id, at })
            }
            None => {
                self.now = self.now.max(until);
                None
            }
        }
    }

    /// Dispatch every event due at or before `until` to `component`.
    ///
    /// Returns the number of events dispatched. Errors from the component
    /// stop the run and propagate to the caller.
    pub fn run_until(&mut self, until: Duration, component: &mut dyn Component) -> Result<usize> {
        let mut dispatched = 0;
        while let Some(event) = self.poll(until) {
            component.handle(self, &event)?;
            dispatched += 1;
        }
        Ok(dispatched)
    }

    /// Drive `component` against the wall clock for `duration`.
    ///
    /// Sleeps until the next due timer between dispatches. Ticks missed by
    /// more than one period (a stalled process) are dropped, not replayed.
    pub fn run_realtime(
        &mut self,
        duration: Duration,
        component: &mut dyn Component,
    ) -> Result<usize> {
        let start = Instant::now();
        let base = self.now;
        let mut dispatched = 0;

        loop {
            let elapsed = start.elapsed().min(duration);
            let now = base + elapsed;
            let skipped: u32 = self
                .timers
                .iter_mut()
                .filter(|t| t.live.get())
                .map(|t| t.cadence.skip_missed(now))
                .sum();
            if skipped > 0 {
                log::debug!("host stalled, dropped {skipped} missed tick(s)");
            }

            dispatched += self.run_until(now, component)?;

            if elapsed >= duration || !component.is_running() {
                break;
            }

            let wake = self
                .next_due()
                .map(|due| due.saturating_sub(base))
                .unwrap_or(duration)
                .min(duration);
            if wake > elapsed {
                std::thread::sleep(wake - elapsed);
            }
        }

        Ok(dispatched)
    }
}
