//! Stopwatch
//!
//! Measures wall time between points in the task, e.g. reaction time from
//! cue onset to lever press.

use etholoop_hal::MonotonicClock;

/// Millisecond stopwatch started at construction
#[derive(Debug, Clone)]
pub struct Stopwatch<C> {
    clock: C,
    origin: u32,
}

impl<C: MonotonicClock> Stopwatch<C> {
    /// Create a stopwatch running from now
    pub fn new(clock: C) -> Self {
        let origin = clock.now_ms();
        Self { clock, origin }
    }

    /// Time since the last lap (or construction), then restart
    pub fn lap(&mut self) -> u32 {
        let now = self.clock.now_ms();
        let elapsed = now.wrapping_sub(self.origin);
        self.origin = now;
        elapsed
    }

    /// Time since the last lap without restarting
    pub fn elapsed(&self) -> u32 {
        self.clock.elapsed_since(self.origin)
    }

    /// Restart from now, discarding the running time
    pub fn restart(&mut self) {
        self.origin = self.clock.now_ms();
    }
}
