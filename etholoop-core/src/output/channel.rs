//! Self-driving output channel
//!
//! ```text
//!            fire(d, level)                 poll() with now >= t0 + d
//!   Idle ──────────────────────► Armed ───────────────────────────► Idle
//!    ▲                            │  ▲                                │
//!    │                            └──┘ fire() again: deadline         │
//!    │                                 replaced, no queueing          │
//!    └──────────────────────── deassert ◄─────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut valve = DigitalOutput::new(clock, DigitalActuator::new_active_high(pin));
//! valve.fire(80, true); // open for 80 ms
//!
//! loop {
//!     if let Some(late_ms) = valve.poll() {
//!         // valve closed `late_ms` after its intended time
//!     }
//! }
//! ```

use etholoop_hal::MonotonicClock;

use super::actuator::{Actuator, AnalogActuator, Cue, DigitalActuator, ToneActuator};
use crate::timing::Deadline;

/// One actuator with one pending deassertion
#[derive(Debug)]
pub struct ScheduledOutput<C, A> {
    clock: C,
    actuator: A,
    deadline: Deadline,
}

/// Digital level channel
pub type DigitalOutput<C, P> = ScheduledOutput<C, DigitalActuator<P>>;
/// PWM duty channel
pub type AnalogOutput<C, P> = ScheduledOutput<C, AnalogActuator<P>>;
/// Buzzer channel
pub type ToneChannel<C, T> = ScheduledOutput<C, ToneActuator<T>>;
/// Channel whose kind (steady or tone) is chosen at construction
pub type CueOutput<C, P, T> = ScheduledOutput<C, Cue<P, T>>;

impl<C: MonotonicClock, A: Actuator> ScheduledOutput<C, A> {
    /// Take ownership of `actuator`, leaving it deasserted and idle
    pub fn new(clock: C, mut actuator: A) -> Self {
        actuator.deassert();
        Self {
            clock,
            actuator,
            deadline: Deadline::idle(),
        }
    }

    /// Assert `level` now and schedule deassertion `duration_ms` from now
    ///
    /// Firing an armed channel replaces its deadline. A zero duration is due
    /// on the very next poll.
    pub fn fire(&mut self, duration_ms: u32, level: A::Level) {
        self.actuator.assert(level);
        self.deadline.arm(self.clock.now_ms(), duration_ms);
    }

    /// Deassert the actuator if its deadline is due
    ///
    /// Returns how many milliseconds after the intended time the deassertion
    /// happened, or `None` when nothing was deasserted by this call.
    pub fn poll(&mut self) -> Option<u32> {
        let overshoot = self.deadline.expire(self.clock.now_ms())?;
        self.actuator.deassert();
        Some(overshoot)
    }

    /// Drop the pending deadline, leaving the actuator as it is
    pub fn disarm(&mut self) {
        self.deadline.disarm();
    }

    /// Deassert immediately and drop the pending deadline
    pub fn stop(&mut self) {
        self.deadline.disarm();
        self.actuator.deassert();
    }

    /// Whether a deassertion is pending
    pub fn is_armed(&self) -> bool {
        self.deadline.is_armed()
    }

    /// Whether the actuator is currently driven
    pub fn is_asserted(&self) -> bool {
        self.actuator.is_asserted()
    }

    /// Time left until deassertion, `None` when idle
    pub fn remaining(&self) -> Option<u32> {
        self.deadline.remaining(self.clock.now_ms())
    }

    /// Absolute deassertion time, [`CLOCK_MAX`](etholoop_hal::CLOCK_MAX) when idle
    pub fn until(&self) -> u32 {
        self.deadline.until()
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use etholoop_hal::mock::{MockClock, MockOutputPin, MockPwm, MockTone};
    use etholoop_hal::CLOCK_MAX;
    use proptest::prelude::*;

    #[test]
    fn test_fire_then_deassert_on_deadline() {
        let clock = MockClock::new(0);
        let level = Cell::new(false);
        let mut out =
            DigitalOutput::new(&clock, DigitalActuator::new_active_high(MockOutputPin::new(&level)));

        out.fire(100, true);
        assert!(level.get());
        assert!(out.is_armed());

        clock.advance(99);
        assert_eq!(out.poll(), None);
        assert!(level.get());

        clock.advance(1);
        assert_eq!(out.poll(), Some(0));
        assert!(!level.get());
        assert!(!out.is_armed());

        // Nothing left to do
        assert_eq!(out.poll(), None);
    }

    #[test]
    fn test_late_poll_reports_overshoot() {
        let clock = MockClock::new(500);
        let duty = Cell::new(0);
        let mut out = AnalogOutput::new(&clock, AnalogActuator::new(MockPwm::new(&duty)));

        out.fire(20, 200);
        assert_eq!(duty.get(), 200);

        clock.advance(33);
        assert_eq!(out.poll(), Some(13));
        assert_eq!(duty.get(), 0);
    }

    #[test]
    fn test_refire_replaces_deadline() {
        let clock = MockClock::new(0);
        let freq = Cell::new(None);
        let mut out = ToneChannel::new(&clock, ToneActuator::new(MockTone::new(&freq)));

        out.fire(50, 440);
        clock.advance(40);
        out.fire(50, 880);
        clock.advance(20);

        // First deadline (t=50) must not deassert
        assert_eq!(out.poll(), None);
        assert_eq!(freq.get(), Some(880));

        clock.advance(30);
        assert_eq!(out.poll(), Some(0));
        assert_eq!(freq.get(), None);
    }

    #[test]
    fn test_zero_duration_due_next_poll() {
        let clock = MockClock::new(7);
        let level = Cell::new(false);
        let mut out =
            DigitalOutput::new(&clock, DigitalActuator::new_active_high(MockOutputPin::new(&level)));

        out.fire(0, true);
        assert!(level.get());
        assert_eq!(out.poll(), Some(0));
        assert!(!level.get());
    }

    #[test]
    fn test_stop_and_disarm() {
        let clock = MockClock::new(0);
        let level = Cell::new(false);
        let mut out =
            DigitalOutput::new(&clock, DigitalActuator::new_active_high(MockOutputPin::new(&level)));

        out.fire(10, true);
        out.disarm();
        clock.advance(100);
        assert_eq!(out.poll(), None);
        assert!(level.get());

        out.fire(10, true);
        out.stop();
        assert!(!level.get());
        assert!(!out.is_armed());
    }

    #[test]
    fn test_wraparound_fires_after_real_duration() {
        let clock = MockClock::new(CLOCK_MAX - 3);
        let level = Cell::new(false);
        let mut out =
            DigitalOutput::new(&clock, DigitalActuator::new_active_high(MockOutputPin::new(&level)));

        out.fire(10, true);
        assert_eq!(out.until(), 6);

        for _ in 0..9 {
            clock.advance(1);
            assert_eq!(out.poll(), None);
            assert!(level.get());
        }

        clock.advance(1);
        assert_eq!(out.poll(), Some(0));
        assert!(!level.get());
    }

    #[test]
    fn test_cue_selected_at_construction() {
        let clock = MockClock::new(0);
        let freq = Cell::new(None);
        let mut cue: CueOutput<_, MockOutputPin, MockTone> =
            CueOutput::new(&clock, Cue::tone(MockTone::new(&freq)));

        cue.fire(5, 2_000);
        assert_eq!(freq.get(), Some(2_000));
        clock.advance(5);
        assert_eq!(cue.poll(), Some(0));
        assert_eq!(freq.get(), None);
    }

    proptest! {
        #[test]
        fn prop_asserted_until_deadline(
            t0 in any::<u32>(),
            duration in 0u32..5_000,
            steps in proptest::collection::vec(1u32..50, 1..200),
        ) {
            let clock = MockClock::new(t0);
            let level = Cell::new(false);
            let mut out = DigitalOutput::new(
                &clock,
                DigitalActuator::new_active_high(MockOutputPin::new(&level)),
            );
            out.fire(duration, true);

            let mut elapsed: u64 = 0;
            let mut fired = false;
            for step in steps {
                clock.advance(step);
                elapsed += u64::from(step);
                let result = out.poll();
                if fired {
                    prop_assert_eq!(result, None);
                } else if elapsed >= u64::from(duration) {
                    prop_assert_eq!(result, Some((elapsed - u64::from(duration)) as u32));
                    prop_assert!(!level.get());
                    fired = true;
                } else {
                    prop_assert_eq!(result, None);
                    prop_assert!(level.get());
                }
            }
        }
    }
}
