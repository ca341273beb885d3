//! Fixed-period cadence for host timers

use std::time::Duration;

/// Shortest period a cadence accepts; anything smaller would spin the loop
const MIN_PERIOD: Duration = Duration::from_micros(100);

/// Tracks when a periodic timer is next due, in host time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    period: Duration,
    next_due: Duration,
}

impl Cadence {
    /// Create a cadence whose first tick is one period after `start`
    pub fn new(start: Duration, period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        Self {
            period,
            next_due: start + period,
        }
    }

    /// Create a cadence ticking `hz` times per second (default refresh is 60Hz)
    pub fn from_hz(start: Duration, hz: f64) -> Self {
        let hz = if hz.is_finite() && hz > 0.0 { hz } else { 60.0 };
        Self::new(start, Duration::from_secs_f64(1.0 / hz))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_due(&self) -> Duration {
        self.next_due
    }

    /// Returns true if a tick is due at or before `now`
    pub fn is_due(&self, now: Duration) -> bool {
        self.next_due <= now
    }

    /// Consume one tick, scheduling the next one period later
    pub fn consume(&mut self) {
        self.next_due += self.period;
    }

    /// Drop ticks that fell more than one period behind `now`.
    ///
    /// At most one overdue tick survives, so a stalled loop resumes with a
    /// single late tick instead of a burst. Returns the number dropped.
    pub fn skip_missed(&mut self, now: Duration) -> u32 {
        if self.next_due + self.period > now {
            return 0;
        }
        let behind = now - self.next_due;
        let missed = (behind.as_nanos() / self.period.as_nanos()) as u32;
        self.next_due += self.period * missed;
        missed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_one_period_after_start() {
        let cadence = Cadence::new(Duration::from_millis(50), Duration::from_millis(100));
        assert_eq!(cadence.next_due(), Duration::from_millis(150));
        assert!(!cadence.is_due(Duration::from_millis(149)));
        assert!(cadence.is_due(Duration::from_millis(150)));
    }

    #[test]
    fn test_consume_advances_by_period() {
        let mut cadence = Cadence::new(Duration::ZERO, Duration::from_millis(100));
        let mut fired = 0;
        let now = Duration::from_millis(350);
        while cadence.is_due(now) {
            cadence.consume();
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert_eq!(cadence.next_due(), Duration::from_millis(400));
    }

    #[test]
    fn test_from_hz() {
        let cadence = Cadence::from_hz(Duration::ZERO, 60.0);
        assert!((cadence.period().as_secs_f64() - 1.0 / 60.0).abs() < 1e-8);
    }

    #[test]
    fn test_invalid_hz_falls_back() {
        let cadence = Cadence::from_hz(Duration::ZERO, 0.0);
        assert!((cadence.period().as_secs_f64() - 1.0 / 60.0).abs() < 1e-8);
    }

    #[test]
    fn test_zero_period_clamped() {
        let cadence = Cadence::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(cadence.period(), MIN_PERIOD);
    }

    #[test]
    fn test_skip_missed_leaves_one_late_tick() {
        let mut cadence = Cadence::new(Duration::ZERO, Duration::from_millis(100));
        let skipped = cadence.skip_missed(Duration::from_millis(1050));
        assert_eq!(skipped, 9);
        assert_eq!(cadence.next_due(), Duration::from_millis(1000));
        assert!(cadence.is_due(Duration::from_millis(1050)));
    }

    #[test]
    fn test_skip_missed_noop_when_on_time() {
        let mut cadence = Cadence::new(Duration::ZERO, Duration::from_millis(100));
        assert_eq!(cadence.skip_missed(Duration::from_millis(150)), 0);
        assert_eq!(cadence.next_due(), Duration::from_millis(100));
    }
}
