//! Time management utilities

use std::time::{Duration, Instant};

/// Frame timer measuring the wall-clock time between consecutive ticks
///
/// The delta is taken from a monotonic clock, so it is never negative.
pub struct Timer {
    last_tick: Instant,
    delta: Duration,
    total: Duration,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            delta: Duration::ZERO,
            total: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Restart measuring from now without touching the totals
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
        self.delta = Duration::ZERO;
    }

    /// Advance the timer and return the time elapsed since the previous tick
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        self.delta = now.saturating_duration_since(self.last_tick);
        self.total += self.delta;
        self.last_tick = now;
        self.frame_count += 1;
        self.delta
    }

    /// Time between the last two ticks
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time between the last two ticks in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Sum of every measured delta
    pub fn total_time(&self) -> Duration {
        self.total
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        let total = self.total.as_secs_f32();
        if total > 0.0 {
            self.frame_count as f32 / total
        } else {
            0.0
        }
    }
}

/// Fixed-rate ticker for the frame loop
///
/// Sleeps away whatever is left of the current tick so the loop runs at
/// roughly `rate` ticks per second.
pub struct Ticker {
    period: Duration,
    next_deadline: Instant,
}

impl Ticker {
    /// Create a ticker firing `rate` times per second (a rate of 0 means "as fast as possible")
    pub fn new(rate: u32) -> Self {
        let period = if rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / f64::from(rate))
        };
        Self {
            period,
            next_deadline: Instant::now() + period,
        }
    }

    /// Duration of one tick
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Block until the current tick is over
    pub fn wait(&mut self) {
        let now = Instant::now();
        if self.next_deadline > now {
            std::thread::sleep(self.next_deadline - now);
            self.next_deadline += self.period;
        } else {
            // Running behind: don't try to catch up with a burst of ticks.
            self.next_deadline = now + self.period;
        }
    }
}
