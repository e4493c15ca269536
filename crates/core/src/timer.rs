//! Frame timer driving the periodic render tick.

use std::time::{Duration, Instant};

/// Fixed-interval frame clock.
///
/// The editor redraws on a periodic tick rather than as fast as possible;
/// `Timer` tracks when the last tick fired and whether the next one is due.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    last_tick: Instant,
    interval: Duration,
    frames: u64,
}

impl Timer {
    /// Create a timer that ticks every `interval`, starting from now.
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            interval,
            frames: 0,
        }
    }

    /// Create a timer from a tick interval in milliseconds.
    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Get the total elapsed time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// The configured tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of ticks fired so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Time left until the next tick is due, zero if it is already due.
    pub fn until_next_tick(&self) -> Duration {
        self.interval.saturating_sub(self.last_tick.elapsed())
    }

    /// Fire a tick if one is due.
    ///
    /// Returns the time since the previous tick when it fires.
    pub fn poll_tick(&mut self) -> Option<Duration> {
        let now = Instant::now();
        let delta = now - self.last_tick;
        if delta < self.interval {
            return None;
        }
        self.last_tick = now;
        self.frames += 1;
        Some(delta)
    }

    /// Reset the timer to the current time.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last_tick = now;
        self.frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_always_due() {
        let mut timer = Timer::new(Duration::ZERO);
        assert!(timer.poll_tick().is_some());
        assert!(timer.poll_tick().is_some());
        assert_eq!(timer.frames(), 2);
    }

    #[test]
    fn test_long_interval_not_due() {
        let mut timer = Timer::from_millis(60_000);
        assert!(timer.poll_tick().is_none());
        assert_eq!(timer.frames(), 0);
        assert!(timer.until_next_tick() > Duration::ZERO);
    }
}
