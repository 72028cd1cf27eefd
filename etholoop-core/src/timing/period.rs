//! Trial period bookkeeping
//!
//! A behavioral task is a sequence of named periods (inter-trial interval,
//! cue, response window, ...), each with an optional time limit. The sketch
//! branches on the current period name and checks [`TrialPeriod::expired`]
//! once per loop.

use heapless::String;

use etholoop_hal::{MonotonicClock, CLOCK_MAX};

use super::deadline::Deadline;

/// Default capacity of a period name in bytes
pub const MAX_PERIOD_NAME: usize = 16;

/// Current task period and its deadline
#[derive(Debug, Clone)]
pub struct TrialPeriod<C, const N: usize = MAX_PERIOD_NAME> {
    clock: C,
    name: String<N>,
    deadline: Deadline,
}

impl<C: MonotonicClock, const N: usize> TrialPeriod<C, N> {
    /// Create an unnamed, unlimited period
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            name: String::new(),
            deadline: Deadline::idle(),
        }
    }

    /// Enter a new period lasting `length_ms`
    ///
    /// A length of `0` or [`CLOCK_MAX`] means the period has no limit.
    /// Names longer than the capacity are cut at a character boundary.
    pub fn set(&mut self, name: &str, length_ms: u32) {
        self.name.clear();
        for c in name.chars() {
            if self.name.push(c).is_err() {
                break;
            }
        }

        if length_ms == 0 || length_ms == CLOCK_MAX {
            self.deadline.disarm();
        } else {
            self.deadline.arm(self.clock.now_ms(), length_ms);
        }
    }

    /// Whether the current period is `name`
    pub fn is(&self, name: &str) -> bool {
        self.name.as_str() == name
    }

    /// Name of the current period
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the time limit has been reached (never for unlimited periods)
    pub fn expired(&self) -> bool {
        self.deadline.is_due(self.clock.now_ms())
    }

    /// Absolute deadline of the period, [`CLOCK_MAX`] when unlimited
    pub fn until(&self) -> u32 {
        self.deadline.until()
    }

    /// Time left in the period, `None` when unlimited
    pub fn remaining(&self) -> Option<u32> {
        self.deadline.remaining(self.clock.now_ms())
    }
}
