//! Debounced tracker for a computed signal
//!
//! Same debounce rule as [`DigitalInputs`](super::DigitalInputs), but the
//! value is handed in on each poll: an analog reading compared against a
//! threshold, a combination of several pins, a virtual lever driven over
//! serial.

use etholoop_hal::{MonotonicClock, OutputPin};

use super::debounce::{DebounceState, Transition};
use super::digital::NoRelay;

/// Single debounced boolean fed by the caller
#[derive(Debug)]
pub struct BoolTracker<C, R = NoRelay> {
    clock: C,
    relay: Option<R>,
    state: DebounceState,
    debounce_ms: u32,
    last_poll_ms: u32,
}

impl<C: MonotonicClock> BoolTracker<C, NoRelay> {
    pub fn new(clock: C, initial: bool, debounce_ms: u32) -> Self {
        Self::build(clock, initial, None, debounce_ms)
    }
}

impl<C: MonotonicClock, R: OutputPin> BoolTracker<C, R> {
    /// Track a value mirrored onto `relay`, which is driven immediately
    pub fn with_relay(clock: C, initial: bool, relay: R, debounce_ms: u32) -> Self {
        Self::build(clock, initial, Some(relay), debounce_ms)
    }

    fn build(clock: C, initial: bool, mut relay: Option<R>, debounce_ms: u32) -> Self {
        if let Some(relay) = relay.as_mut() {
            relay.set_state(initial);
        }
        let last_poll_ms = clock.now_ms();
        Self {
            clock,
            relay,
            state: DebounceState::new(initial),
            debounce_ms,
            last_poll_ms,
        }
    }

    /// Offer this loop's value
    ///
    /// Returns the milliseconds elapsed since the previous poll.
    pub fn poll(&mut self, value: bool) -> u32 {
        let now = self.clock.now_ms();
        let elapsed = now.wrapping_sub(self.last_poll_ms);
        self.last_poll_ms = now;

        let accepted = self.state.step(elapsed, self.debounce_ms, || value);
        if let (Some(value), Some(relay)) = (accepted, self.relay.as_mut()) {
            relay.set_state(value);
        }

        elapsed
    }

    pub fn on(&self) -> bool {
        self.state.on()
    }

    pub fn off(&self) -> bool {
        self.state.off()
    }

    pub fn turned_on(&self) -> bool {
        self.state.turned_on()
    }

    pub fn turned_off(&self) -> bool {
        self.state.turned_off()
    }

    pub fn changed(&self) -> bool {
        self.state.changed()
    }

    pub fn unchanged(&self) -> bool {
        self.state.unchanged()
    }

    pub fn transition(&self) -> Transition {
        self.state.transition()
    }

    /// Silence left before the next value is accepted
    pub fn silence_ms(&self) -> u32 {
        self.state.silence_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use etholoop_hal::mock::{MockClock, MockOutputPin};
    use proptest::prelude::*;

    #[test]
    fn test_threshold_crossing() {
        let clock = MockClock::new(0);
        let mut licking = BoolTracker::new(&clock, false, 2);

        for reading in [120u16, 300, 650, 700, 710] {
            clock.advance(1);
            licking.poll(reading > 512);
            if reading == 650 {
                assert!(licking.turned_on());
            } else {
                assert!(!licking.turned_on());
            }
        }
        assert!(licking.on());
    }

    #[test]
    fn test_second_toggle_held_until_window_ends() {
        let clock = MockClock::new(0);
        let mut tracker = BoolTracker::new(&clock, false, 10);

        clock.advance(1);
        tracker.poll(true);
        assert!(tracker.turned_on());

        // Toggles back within the window: first toggle's value is kept
        for _ in 0..4 {
            clock.advance(2);
            tracker.poll(false);
            assert!(tracker.on());
            assert!(tracker.unchanged());
        }

        // 10 ms since the edge
        clock.advance(2);
        tracker.poll(false);
        assert!(tracker.turned_off());
    }

    #[test]
    fn test_toggle_reverted_before_window_ends() {
        let clock = MockClock::new(0);
        let mut tracker = BoolTracker::new(&clock, false, 5);

        clock.advance(1);
        tracker.poll(true);
        clock.advance(2);
        tracker.poll(false);
        clock.advance(3);
        // Window over but the value went back to true: no second edge
        tracker.poll(true);
        assert!(tracker.on());
        assert!(tracker.unchanged());
    }

    #[test]
    fn test_relay() {
        let clock = MockClock::new(0);
        let relay = Cell::new(true);
        let mut tracker = BoolTracker::with_relay(&clock, false, MockOutputPin::new(&relay), 0);
        assert!(!relay.get());

        clock.advance(1);
        tracker.poll(true);
        assert!(relay.get());
        clock.advance(1);
        tracker.poll(false);
        assert!(!relay.get());
    }

    proptest! {
        #[test]
        fn prop_steady_value_never_edges(
            start in any::<u32>(),
            value in any::<bool>(),
            gaps in proptest::collection::vec(0u32..1000, 1..200),
        ) {
            let clock = MockClock::new(start);
            let mut tracker = BoolTracker::new(&clock, value, 7);
            for gap in gaps {
                clock.advance(gap);
                tracker.poll(value);
                prop_assert!(!tracker.turned_on() && !tracker.turned_off());
                prop_assert_eq!(tracker.silence_ms(), 0);
            }
        }

        #[test]
        fn prop_relay_follows_value(
            toggles in proptest::collection::vec((any::<bool>(), 0u32..8), 1..200),
        ) {
            let clock = MockClock::new(0);
            let relay = Cell::new(false);
            let mut tracker = BoolTracker::with_relay(&clock, false, MockOutputPin::new(&relay), 3);
            for (value, gap) in toggles {
                clock.advance(gap);
                tracker.poll(value);
                prop_assert_eq!(relay.get(), tracker.on());
            }
        }
    }
}
